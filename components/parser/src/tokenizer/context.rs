//! Syntactic context tracking for regex/divide disambiguation

use super::Tokenizer;
use crate::options::EcmaVersion;
use crate::token::{TokenType, TokenValue};

/// A marker on the tokenizer's context stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokContext {
    /// `{` opening a block
    BraceStatement,
    /// `{` opening an object literal or similar
    BraceExpression,
    /// `${` inside a template
    BraceTemplate,
    /// `(` after `if`, `for`, `with` or `while`
    ParenStatement,
    /// Any other `(`
    ParenExpression,
    /// Inside a template literal
    QuoteTemplate,
    /// Function declaration
    FunctionStatement,
    /// Function expression
    FunctionExpression,
    /// Generator function expression
    FunctionExpressionGenerator,
    /// Generator function declaration
    FunctionGenerator,
}

impl TokContext {
    /// Whether the context is expression-like
    pub fn is_expr(self) -> bool {
        matches!(
            self,
            TokContext::BraceExpression
                | TokContext::ParenExpression
                | TokContext::QuoteTemplate
                | TokContext::FunctionExpression
                | TokContext::FunctionExpressionGenerator
        )
    }

    /// Whitespace is significant inside the context
    pub fn preserve_space(self) -> bool {
        self == TokContext::QuoteTemplate
    }

    /// Whether the context belongs to a `function` keyword
    pub fn is_function(self) -> bool {
        matches!(
            self,
            TokContext::FunctionStatement
                | TokContext::FunctionExpression
                | TokContext::FunctionExpressionGenerator
                | TokContext::FunctionGenerator
        )
    }

    /// Whether the context belongs to a generator function
    pub fn is_generator(self) -> bool {
        matches!(
            self,
            TokContext::FunctionExpressionGenerator | TokContext::FunctionGenerator
        )
    }
}

impl<'a> Tokenizer<'a> {
    /// Current (innermost) context
    pub(crate) fn cur_context(&self) -> TokContext {
        self.context
            .last()
            .copied()
            .unwrap_or(TokContext::BraceStatement)
    }

    /// Replace the innermost context
    pub(crate) fn override_context(&mut self, ctx: TokContext) {
        if let Some(top) = self.context.last_mut() {
            *top = ctx;
        }
    }

    /// Whether the innermost function context is a generator
    pub(crate) fn in_generator_context(&self) -> bool {
        self.context
            .iter()
            .skip(1)
            .rev()
            .find(|ctx| ctx.is_function())
            .is_some_and(|ctx| ctx.is_generator())
    }

    fn brace_is_block(&self, prev: TokenType) -> bool {
        let parent = self.cur_context();
        if matches!(
            parent,
            TokContext::FunctionExpression | TokContext::FunctionStatement
        ) {
            return true;
        }
        if prev == TokenType::Colon
            && matches!(
                parent,
                TokContext::BraceStatement | TokContext::BraceExpression
            )
        {
            return !parent.is_expr();
        }
        // `name` with expr_allowed is `yield` or `of`
        if prev == TokenType::Return || (prev == TokenType::Name && self.expr_allowed) {
            return self.has_line_break(self.last_tok_end, self.start);
        }
        match prev {
            TokenType::Else
            | TokenType::Semi
            | TokenType::Eof
            | TokenType::ParenR
            | TokenType::Arrow => true,
            TokenType::BraceL => parent == TokContext::BraceStatement,
            TokenType::Var | TokenType::Const | TokenType::Name => false,
            _ => !self.expr_allowed,
        }
    }

    pub(crate) fn pop_context(&mut self) -> Option<TokContext> {
        // The outermost context is never popped
        if self.context.len() > 1 {
            self.context.pop()
        } else {
            None
        }
    }

    /// Recompute `expr_allowed` and the context stack after a token
    pub(crate) fn update_context(&mut self, prev: TokenType) {
        let ty = self.ty;
        if ty.keyword().is_some() && prev == TokenType::Dot {
            self.expr_allowed = false;
            return;
        }
        match ty {
            TokenType::ParenR | TokenType::BraceR => {
                if self.context.len() == 1 {
                    self.expr_allowed = true;
                    return;
                }
                let mut out = self.pop_context();
                if out == Some(TokContext::BraceStatement) && self.cur_context().is_function() {
                    out = self.pop_context();
                }
                self.expr_allowed = !out.is_some_and(TokContext::is_expr);
            }
            TokenType::BraceL => {
                let ctx = if self.brace_is_block(prev) {
                    TokContext::BraceStatement
                } else {
                    TokContext::BraceExpression
                };
                self.context.push(ctx);
                self.expr_allowed = true;
            }
            TokenType::DollarBraceL => {
                self.context.push(TokContext::BraceTemplate);
                self.expr_allowed = true;
            }
            TokenType::ParenL => {
                let statement_parens = matches!(
                    prev,
                    TokenType::If | TokenType::For | TokenType::With | TokenType::While
                );
                self.context.push(if statement_parens {
                    TokContext::ParenStatement
                } else {
                    TokContext::ParenExpression
                });
                self.expr_allowed = true;
            }
            TokenType::IncDec => {}
            TokenType::Function | TokenType::Class => {
                let cur = self.cur_context();
                let expression = prev.before_expr()
                    && prev != TokenType::Else
                    && !(prev == TokenType::Semi && cur != TokContext::ParenStatement)
                    && !(prev == TokenType::Return
                        && self.has_line_break(self.last_tok_end, self.start))
                    && !(matches!(prev, TokenType::Colon | TokenType::BraceL)
                        && cur == TokContext::BraceStatement);
                self.context.push(if expression {
                    TokContext::FunctionExpression
                } else {
                    TokContext::FunctionStatement
                });
                self.expr_allowed = false;
            }
            TokenType::Colon => {
                if self.cur_context().is_function() {
                    self.pop_context();
                }
                self.expr_allowed = true;
            }
            TokenType::BackQuote => {
                if self.cur_context() == TokContext::QuoteTemplate {
                    self.pop_context();
                } else {
                    self.context.push(TokContext::QuoteTemplate);
                }
                self.expr_allowed = false;
            }
            TokenType::Star => {
                if prev == TokenType::Function {
                    let generator = if self.cur_context() == TokContext::FunctionExpression {
                        TokContext::FunctionExpressionGenerator
                    } else {
                        TokContext::FunctionGenerator
                    };
                    self.override_context(generator);
                }
                self.expr_allowed = true;
            }
            TokenType::Name => {
                let mut allowed = false;
                if self.options.ecma_version >= EcmaVersion::ES2015 && prev != TokenType::Dot {
                    if let TokenValue::Str(word) = &self.value {
                        if (word == "of" && !self.expr_allowed)
                            || (word == "yield" && self.in_generator_context())
                        {
                            allowed = true;
                        }
                    }
                }
                self.expr_allowed = allowed;
            }
            _ => self.expr_allowed = ty.before_expr(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_contexts() {
        assert!(TokContext::BraceExpression.is_expr());
        assert!(TokContext::QuoteTemplate.is_expr());
        assert!(!TokContext::BraceStatement.is_expr());
        assert!(!TokContext::BraceTemplate.is_expr());
    }

    #[test]
    fn test_function_contexts() {
        assert!(TokContext::FunctionGenerator.is_function());
        assert!(TokContext::FunctionGenerator.is_generator());
        assert!(!TokContext::FunctionStatement.is_generator());
        assert!(!TokContext::ParenExpression.is_function());
    }
}
