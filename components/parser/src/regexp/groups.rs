//! Pre-pass over a pattern: bracket balance, capture group numbering and
//! group-name validation

use super::{CapturingGroup, RegExpParser};
use crate::character::{from_surrogate_pair, is_identifier_char, is_identifier_start};
use crate::character::{is_lead_surrogate, is_trail_surrogate};
use crate::error::ParseResult;
use crate::options::EcmaVersion;
use core_types::ErrorCode;
use std::collections::HashMap;

/// Alternatives of every disjunction seen so far.
///
/// Each node is one alternative; `base` identifies the first alternative of
/// its disjunction, so two nodes with the same base and different ids are
/// siblings that can never match together.
#[derive(Debug, Default)]
struct BranchTree {
    nodes: Vec<Branch>,
}

#[derive(Debug, Clone, Copy)]
struct Branch {
    parent: Option<usize>,
    base: usize,
}

impl BranchTree {
    fn open(&mut self, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Branch { parent, base: id });
        id
    }

    fn sibling(&mut self, of: usize) -> usize {
        let branch = self.nodes[of];
        self.nodes.push(branch);
        self.nodes.len() - 1
    }

    fn parent(&self, of: usize) -> Option<usize> {
        self.nodes[of].parent
    }

    fn ancestors(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(from), move |&id| self.nodes[id].parent)
    }

    /// Whether `a` and `b` lie in different alternatives of some disjunction
    fn separated(&self, a: usize, b: usize) -> bool {
        self.ancestors(a).any(|left| {
            self.ancestors(b)
                .any(|right| left != right && self.nodes[left].base == self.nodes[right].base)
        })
    }
}

/// Read a `\u` escape starting on the `u`.
///
/// With `unicode`, `\u{...}` is accepted and an escaped surrogate pair is
/// combined. Returns the code point and the index after the escape.
pub(crate) fn read_unicode_escape(chars: &[char], pos: usize, unicode: bool) -> Option<(u32, usize)> {
    if let Some(lead) = read_hex(chars, pos + 1, 4) {
        let next = pos + 5;
        if unicode && is_lead_surrogate(lead) && chars.get(next) == Some(&'\\') && chars.get(next + 1) == Some(&'u') {
            if let Some(trail) = read_hex(chars, next + 2, 4) {
                if is_trail_surrogate(trail) {
                    return Some((from_surrogate_pair(lead, trail), next + 6));
                }
            }
        }
        return Some((lead, next));
    }
    if unicode && chars.get(pos + 1) == Some(&'{') {
        let mut end = pos + 2;
        let mut value = 0u32;
        while let Some(digit) = chars.get(end).and_then(|ch| ch.to_digit(16)) {
            value = value.saturating_mul(16).saturating_add(digit);
            end += 1;
        }
        if end > pos + 2 && value <= 0x10FFFF && chars.get(end) == Some(&'}') {
            return Some((value, end + 1));
        }
    }
    None
}

/// Exactly `count` hex digits starting at `pos`
pub(crate) fn read_hex(chars: &[char], pos: usize, count: usize) -> Option<u32> {
    let digits = chars.get(pos..pos + count)?;
    digits
        .iter()
        .try_fold(0u32, |acc, ch| Some(acc * 16 + ch.to_digit(16)?))
}

/// Read a group name after `<`, up to and including `>`.
///
/// Returns the name and the index after `>`.
pub(crate) fn read_group_name(
    chars: &[char],
    mut pos: usize,
    ecma_version: EcmaVersion,
) -> Option<(String, usize)> {
    let braced = ecma_version >= EcmaVersion::ES2020;
    let mut name = String::new();
    loop {
        let (cp, next) = match chars.get(pos)? {
            '>' => break,
            '\\' => {
                if chars.get(pos + 1) != Some(&'u') {
                    return None;
                }
                read_unicode_escape(chars, pos + 1, braced)?
            }
            &ch => (ch as u32, pos + 1),
        };
        let valid = if name.is_empty() {
            is_identifier_start(cp)
        } else {
            is_identifier_char(cp)
        };
        if !valid {
            return None;
        }
        name.push(char::from_u32(cp)?);
        pos = next;
    }
    if name.is_empty() {
        None
    } else {
        Some((name, pos + 1))
    }
}

enum GroupKind {
    Capturing,
    Other,
}

impl<'a> RegExpParser<'a> {
    /// Number the capturing groups and validate their names
    pub(crate) fn scan_groups(&mut self) -> ParseResult<()> {
        let version = self.options.ecma_version;
        let mut tree = BranchTree::default();
        let mut branch = tree.open(None);
        let mut names: HashMap<String, Vec<usize>> = HashMap::new();
        let mut stack: Vec<(GroupKind, usize)> = Vec::new();
        let mut class_depth = 0usize;
        let mut class_start = 0usize;
        let mut pos = 0usize;

        while let Some(&ch) = self.chars.get(pos) {
            match ch {
                '\\' => {
                    pos += 2;
                    continue;
                }
                '[' if class_depth == 0 || self.unicode_sets => {
                    if class_depth == 0 {
                        class_start = pos;
                    }
                    class_depth += 1;
                }
                ']' if class_depth > 0 => class_depth -= 1,
                _ if class_depth > 0 => {}
                '(' => {
                    let kind = if self.chars.get(pos + 1) == Some(&'?') {
                        match self.chars.get(pos + 2) {
                            Some(':' | '=' | '!') => GroupKind::Other,
                            Some('<')
                                if version >= EcmaVersion::ES2018
                                    && matches!(self.chars.get(pos + 3), Some('=' | '!')) =>
                            {
                                GroupKind::Other
                            }
                            Some('<') if version >= EcmaVersion::ES2018 => {
                                let Some((name, next)) = read_group_name(&self.chars, pos + 3, version)
                                else {
                                    return Err(self.error(
                                        pos + 3,
                                        ErrorCode::RegExpInvalidCaptureGroupName,
                                        "Invalid capture group name",
                                    ));
                                };
                                let known = names.entry(name.clone()).or_default();
                                let duplicate = if version >= EcmaVersion::Experimental {
                                    known.iter().any(|&other| !tree.separated(other, branch))
                                } else {
                                    !known.is_empty()
                                };
                                if duplicate {
                                    return Err(self.error(
                                        pos + 3,
                                        ErrorCode::RegExpDuplicateCaptureGroupName,
                                        "Duplicate capture group name",
                                    ));
                                }
                                known.push(branch);
                                self.groups.push(CapturingGroup {
                                    index: self.groups.len() + 1,
                                    name: Some(name),
                                    start: self.offsets[pos],
                                });
                                stack.push((GroupKind::Capturing, pos));
                                branch = tree.open(Some(branch));
                                pos = next;
                                continue;
                            }
                            _ => {
                                return Err(self.error(
                                    pos,
                                    ErrorCode::RegExpInvalidGroup,
                                    "Invalid group",
                                ))
                            }
                        }
                    } else {
                        self.groups.push(CapturingGroup {
                            index: self.groups.len() + 1,
                            name: None,
                            start: self.offsets[pos],
                        });
                        GroupKind::Capturing
                    };
                    stack.push((kind, pos));
                    branch = tree.open(Some(branch));
                }
                ')' => {
                    if stack.pop().is_none() {
                        return Err(self.error(pos, ErrorCode::RegExpUnmatchedParen, "Unmatched ')'"));
                    }
                    branch = tree.parent(branch).unwrap_or(branch);
                }
                '|' => branch = tree.sibling(branch),
                _ => {}
            }
            pos += 1;
        }

        if class_depth > 0 {
            return Err(self.error(
                class_start,
                ErrorCode::RegExpUnterminatedCharacterClass,
                "Unterminated character class",
            ));
        }
        if let Some(&(_, open)) = stack.last() {
            return Err(self.error(open, ErrorCode::RegExpUnterminatedGroup, "Unterminated group"));
        }
        self.named_groups = names.values().any(|ids| !ids.is_empty());
        Ok(())
    }

    /// Capturing groups carrying `name`
    pub(crate) fn groups_named(&self, name: &str) -> Vec<usize> {
        self.groups
            .iter()
            .filter(|group| group.name.as_deref() == Some(name))
            .map(|group| group.index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn test_branch_separation() {
        let mut tree = BranchTree::default();
        let root = tree.open(None);
        let first = tree.open(Some(root));
        let second = tree.sibling(first);
        assert!(tree.separated(first, second));
        assert!(!tree.separated(root, first));
        let nested = tree.open(Some(first));
        assert!(tree.separated(nested, second));
    }

    #[test]
    fn test_unicode_escape_forms() {
        assert_eq!(read_unicode_escape(&chars("u0041"), 0, false), Some((0x41, 5)));
        assert_eq!(read_unicode_escape(&chars("u{1F4A9}"), 0, true), Some((0x1F4A9, 8)));
        assert_eq!(read_unicode_escape(&chars("u{1F4A9}"), 0, false), None);
        assert_eq!(
            read_unicode_escape(&chars("uD83D\\uDCA9"), 0, true),
            Some((0x1F4A9, 11))
        );
        assert_eq!(
            read_unicode_escape(&chars("uD83D\\uDCA9"), 0, false),
            Some((0xD83D, 5))
        );
        assert_eq!(read_unicode_escape(&chars("u{110000}"), 0, true), None);
    }

    #[test]
    fn test_group_names() {
        let version = EcmaVersion::LATEST;
        assert_eq!(
            read_group_name(&chars("year>x"), 0, version),
            Some(("year".to_string(), 5))
        );
        assert_eq!(
            read_group_name(&chars("\\u0061b>"), 0, version),
            Some(("ab".to_string(), 8))
        );
        assert_eq!(read_group_name(&chars("1a>"), 0, version), None);
        assert_eq!(read_group_name(&chars(">"), 0, version), None);
        assert_eq!(read_group_name(&chars("abc"), 0, version), None);
    }
}
