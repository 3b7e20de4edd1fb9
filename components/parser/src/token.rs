//! Token types and token snapshots
//!
//! [`TokenType`] is a closed set of statically described token kinds. Each
//! type maps to an immutable [`TokenTypeInfo`] descriptor holding its label,
//! coarse [`TokenKind`], keyword identity, the ECMAScript version that
//! introduced it, its binary-operator precedence and its [`TokenFlags`].

use crate::options::EcmaVersion;
use crate::regexp::RegExpParseResult;
use bitflags::bitflags;
use core_types::SourceLocation;
use num_bigint::BigInt;
use serde::Serialize;

bitflags! {
    /// Grammar properties of a token type
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        /// An expression may follow this token (so `/` starts a regex)
        const BEFORE_EXPRESSION = 1 << 0;
        /// The token can begin an expression
        const STARTS_EXPRESSION = 1 << 1;
        /// The keyword introduces a loop
        const IS_LOOP = 1 << 2;
        /// The token is an assignment operator
        const IS_ASSIGNMENT = 1 << 3;
        /// The token can be a prefix operator
        const PREFIX = 1 << 4;
        /// The token can be a postfix operator
        const POSTFIX = 1 << 5;
    }
}

/// Coarse classification of tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Operators and delimiters
    Punctuator,
    /// Reserved words
    Keyword,
    /// Identifier names (including contextual keywords)
    Identifier,
    /// `#name`
    PrivateIdentifier,
    /// `null`
    NullLiteral,
    /// `true` / `false`
    BooleanLiteral,
    /// String literal
    StringLiteral,
    /// Numeric literal
    NumericLiteral,
    /// BigInt literal
    BigIntLiteral,
    /// Regular expression literal
    RegExpLiteral,
    /// Template chunk
    Template,
    /// End of input
    EOF,
}

/// Static descriptor of a [`TokenType`]
#[derive(Debug)]
pub struct TokenTypeInfo {
    /// Display label
    pub label: &'static str,
    /// Coarse kind
    pub kind: TokenKind,
    /// Keyword text for keyword types
    pub keyword: Option<&'static str>,
    /// First ECMAScript version in which the token exists
    pub ecma_version: EcmaVersion,
    /// Binary operator precedence, -1 when the type is not a binary operator
    pub binop: i8,
    /// Grammar flags
    pub flags: TokenFlags,
}

macro_rules! token_types {
    ($(
        $(#[$doc:meta])*
        $name:ident => $label:literal, $kind:ident, $keyword:expr, $version:ident, $binop:literal, [$($flag:ident)|*];
    )*) => {
        /// The type of a token
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum TokenType {
            $($(#[$doc])* $name,)*
        }

        impl TokenType {
            /// Static descriptor for this token type
            pub fn info(self) -> &'static TokenTypeInfo {
                match self {
                    $(TokenType::$name => {
                        static INFO: TokenTypeInfo = TokenTypeInfo {
                            label: $label,
                            kind: TokenKind::$kind,
                            keyword: $keyword,
                            ecma_version: EcmaVersion::$version,
                            binop: $binop,
                            flags: TokenFlags::empty()$(.union(TokenFlags::$flag))*,
                        };
                        &INFO
                    })*
                }
            }

            /// Every token type, in declaration order
            pub const ALL: &'static [TokenType] = &[$(TokenType::$name,)*];
        }
    };
}

token_types! {
    /// Numeric literal
    Num => "num", NumericLiteral, None, ES3, -1, [STARTS_EXPRESSION];
    /// BigInt literal
    BigInt => "bigint", BigIntLiteral, None, ES2020, -1, [STARTS_EXPRESSION];
    /// Regular expression literal
    Regexp => "regexp", RegExpLiteral, None, ES3, -1, [STARTS_EXPRESSION];
    /// String literal
    String => "string", StringLiteral, None, ES3, -1, [STARTS_EXPRESSION];
    /// Identifier
    Name => "name", Identifier, None, ES3, -1, [STARTS_EXPRESSION];
    /// `#name`
    PrivateId => "privateId", PrivateIdentifier, None, ES2022, -1, [STARTS_EXPRESSION];
    /// End of input
    Eof => "eof", EOF, None, ES3, -1, [];

    /// `[`
    BracketL => "[", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION | STARTS_EXPRESSION];
    /// `]`
    BracketR => "]", Punctuator, None, ES3, -1, [];
    /// `{`
    BraceL => "{", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION | STARTS_EXPRESSION];
    /// `}`
    BraceR => "}", Punctuator, None, ES3, -1, [];
    /// `(`
    ParenL => "(", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION | STARTS_EXPRESSION];
    /// `)`
    ParenR => ")", Punctuator, None, ES3, -1, [];
    /// `,`
    Comma => ",", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION];
    /// `;`
    Semi => ";", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION];
    /// `:`
    Colon => ":", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION];
    /// `.`
    Dot => ".", Punctuator, None, ES3, -1, [];
    /// `?`
    Question => "?", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION];
    /// `?.`
    QuestionDot => "?.", Punctuator, None, ES2020, -1, [];
    /// `=>`
    Arrow => "=>", Punctuator, None, ES2015, -1, [BEFORE_EXPRESSION];
    /// Template chunk
    Template => "template", Template, None, ES2015, -1, [];
    /// Template chunk containing a malformed escape
    InvalidTemplate => "invalidTemplate", Template, None, ES2015, -1, [];
    /// `...`
    Ellipsis => "...", Punctuator, None, ES2015, -1, [BEFORE_EXPRESSION];
    /// `` ` ``
    BackQuote => "`", Punctuator, None, ES2015, -1, [STARTS_EXPRESSION];
    /// `${`
    DollarBraceL => "${", Punctuator, None, ES2015, -1, [BEFORE_EXPRESSION | STARTS_EXPRESSION];
    /// `@` (decorators)
    At => "@", Punctuator, None, Experimental, -1, [BEFORE_EXPRESSION];

    /// `=`
    Eq => "=", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION | IS_ASSIGNMENT];
    /// Compound assignment (`+=`, `&&=`, ...)
    Assign => "_=", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION | IS_ASSIGNMENT];
    /// `++` / `--`
    IncDec => "++/--", Punctuator, None, ES3, -1, [PREFIX | POSTFIX | STARTS_EXPRESSION];
    /// `!` / `~`
    Prefix => "!/~", Punctuator, None, ES3, -1, [BEFORE_EXPRESSION | PREFIX | STARTS_EXPRESSION];
    /// `||`
    LogicalOr => "||", Punctuator, None, ES3, 1, [BEFORE_EXPRESSION];
    /// `&&`
    LogicalAnd => "&&", Punctuator, None, ES3, 2, [BEFORE_EXPRESSION];
    /// `|`
    BitwiseOr => "|", Punctuator, None, ES3, 3, [BEFORE_EXPRESSION];
    /// `^`
    BitwiseXor => "^", Punctuator, None, ES3, 4, [BEFORE_EXPRESSION];
    /// `&`
    BitwiseAnd => "&", Punctuator, None, ES3, 5, [BEFORE_EXPRESSION];
    /// `==`, `!=`, `===`, `!==`
    Equality => "==/!=/===/!==", Punctuator, None, ES3, 6, [BEFORE_EXPRESSION];
    /// `<`, `>`, `<=`, `>=`
    Relational => "</>/<=/>=", Punctuator, None, ES3, 7, [BEFORE_EXPRESSION];
    /// `<<`, `>>`, `>>>`
    BitShift => "<</>>/>>>", Punctuator, None, ES3, 8, [BEFORE_EXPRESSION];
    /// `+` / `-`
    PlusMin => "+/-", Punctuator, None, ES3, 9, [BEFORE_EXPRESSION | PREFIX | STARTS_EXPRESSION];
    /// `%`
    Modulo => "%", Punctuator, None, ES3, 10, [BEFORE_EXPRESSION];
    /// `*`
    Star => "*", Punctuator, None, ES3, 10, [BEFORE_EXPRESSION];
    /// `/`
    Slash => "/", Punctuator, None, ES3, 10, [BEFORE_EXPRESSION];
    /// `**`
    StarStar => "**", Punctuator, None, ES2016, -1, [BEFORE_EXPRESSION];
    /// `??`
    Coalesce => "??", Punctuator, None, ES2020, 1, [BEFORE_EXPRESSION];

    /// `break`
    Break => "break", Keyword, Some("break"), ES3, -1, [];
    /// `case`
    Case => "case", Keyword, Some("case"), ES3, -1, [BEFORE_EXPRESSION];
    /// `catch`
    Catch => "catch", Keyword, Some("catch"), ES3, -1, [];
    /// `continue`
    Continue => "continue", Keyword, Some("continue"), ES3, -1, [];
    /// `debugger`
    Debugger => "debugger", Keyword, Some("debugger"), ES3, -1, [];
    /// `default`
    Default => "default", Keyword, Some("default"), ES3, -1, [BEFORE_EXPRESSION];
    /// `do`
    Do => "do", Keyword, Some("do"), ES3, -1, [IS_LOOP | BEFORE_EXPRESSION];
    /// `else`
    Else => "else", Keyword, Some("else"), ES3, -1, [BEFORE_EXPRESSION];
    /// `finally`
    Finally => "finally", Keyword, Some("finally"), ES3, -1, [];
    /// `for`
    For => "for", Keyword, Some("for"), ES3, -1, [IS_LOOP];
    /// `function`
    Function => "function", Keyword, Some("function"), ES3, -1, [STARTS_EXPRESSION];
    /// `if`
    If => "if", Keyword, Some("if"), ES3, -1, [];
    /// `return`
    Return => "return", Keyword, Some("return"), ES3, -1, [BEFORE_EXPRESSION];
    /// `switch`
    Switch => "switch", Keyword, Some("switch"), ES3, -1, [];
    /// `throw`
    Throw => "throw", Keyword, Some("throw"), ES3, -1, [BEFORE_EXPRESSION];
    /// `try`
    Try => "try", Keyword, Some("try"), ES3, -1, [];
    /// `var`
    Var => "var", Keyword, Some("var"), ES3, -1, [];
    /// `const`
    Const => "const", Keyword, Some("const"), ES2015, -1, [];
    /// `while`
    While => "while", Keyword, Some("while"), ES3, -1, [IS_LOOP];
    /// `with`
    With => "with", Keyword, Some("with"), ES3, -1, [];
    /// `new`
    New => "new", Keyword, Some("new"), ES3, -1, [BEFORE_EXPRESSION | STARTS_EXPRESSION];
    /// `this`
    This => "this", Keyword, Some("this"), ES3, -1, [STARTS_EXPRESSION];
    /// `super`
    Super => "super", Keyword, Some("super"), ES2015, -1, [STARTS_EXPRESSION];
    /// `class`
    Class => "class", Keyword, Some("class"), ES2015, -1, [STARTS_EXPRESSION];
    /// `extends`
    Extends => "extends", Keyword, Some("extends"), ES2015, -1, [BEFORE_EXPRESSION];
    /// `export`
    Export => "export", Keyword, Some("export"), ES2015, -1, [];
    /// `import`
    Import => "import", Keyword, Some("import"), ES2015, -1, [STARTS_EXPRESSION];
    /// `null`
    Null => "null", NullLiteral, Some("null"), ES3, -1, [STARTS_EXPRESSION];
    /// `true`
    True => "true", BooleanLiteral, Some("true"), ES3, -1, [STARTS_EXPRESSION];
    /// `false`
    False => "false", BooleanLiteral, Some("false"), ES3, -1, [STARTS_EXPRESSION];
    /// `in`
    In => "in", Keyword, Some("in"), ES3, 7, [BEFORE_EXPRESSION];
    /// `instanceof`
    Instanceof => "instanceof", Keyword, Some("instanceof"), ES3, 7, [BEFORE_EXPRESSION];
    /// `typeof`
    Typeof => "typeof", Keyword, Some("typeof"), ES3, -1, [BEFORE_EXPRESSION | PREFIX | STARTS_EXPRESSION];
    /// `void`
    Void => "void", Keyword, Some("void"), ES3, -1, [BEFORE_EXPRESSION | PREFIX | STARTS_EXPRESSION];
    /// `delete`
    Delete => "delete", Keyword, Some("delete"), ES3, -1, [BEFORE_EXPRESSION | PREFIX | STARTS_EXPRESSION];
}

impl TokenType {
    /// Display label
    pub fn label(self) -> &'static str {
        self.info().label
    }

    /// Keyword text, for keyword token types
    pub fn keyword(self) -> Option<&'static str> {
        self.info().keyword
    }

    /// Binary precedence, or -1
    pub fn binop(self) -> i8 {
        self.info().binop
    }

    /// An expression may follow this token
    pub fn before_expr(self) -> bool {
        self.info().flags.contains(TokenFlags::BEFORE_EXPRESSION)
    }

    /// The token can start an expression
    pub fn starts_expr(self) -> bool {
        self.info().flags.contains(TokenFlags::STARTS_EXPRESSION)
    }

    /// The token is a loop keyword
    pub fn is_loop(self) -> bool {
        self.info().flags.contains(TokenFlags::IS_LOOP)
    }

    /// The token is an assignment operator
    pub fn is_assign(self) -> bool {
        self.info().flags.contains(TokenFlags::IS_ASSIGNMENT)
    }

    /// The token can be a prefix operator
    pub fn is_prefix(self) -> bool {
        self.info().flags.contains(TokenFlags::PREFIX)
    }

    /// The token can be a postfix operator
    pub fn is_postfix(self) -> bool {
        self.info().flags.contains(TokenFlags::POSTFIX)
    }

    /// Look up the keyword token type for `word`
    pub fn from_keyword(word: &str) -> Option<TokenType> {
        let ty = match word {
            "break" => TokenType::Break,
            "case" => TokenType::Case,
            "catch" => TokenType::Catch,
            "continue" => TokenType::Continue,
            "debugger" => TokenType::Debugger,
            "default" => TokenType::Default,
            "do" => TokenType::Do,
            "else" => TokenType::Else,
            "finally" => TokenType::Finally,
            "for" => TokenType::For,
            "function" => TokenType::Function,
            "if" => TokenType::If,
            "return" => TokenType::Return,
            "switch" => TokenType::Switch,
            "throw" => TokenType::Throw,
            "try" => TokenType::Try,
            "var" => TokenType::Var,
            "const" => TokenType::Const,
            "while" => TokenType::While,
            "with" => TokenType::With,
            "new" => TokenType::New,
            "this" => TokenType::This,
            "super" => TokenType::Super,
            "class" => TokenType::Class,
            "extends" => TokenType::Extends,
            "export" => TokenType::Export,
            "import" => TokenType::Import,
            "null" => TokenType::Null,
            "true" => TokenType::True,
            "false" => TokenType::False,
            "in" => TokenType::In,
            "instanceof" => TokenType::Instanceof,
            "typeof" => TokenType::Typeof,
            "void" => TokenType::Void,
            "delete" => TokenType::Delete,
            _ => return None,
        };
        Some(ty)
    }
}

/// Whether `word` is a keyword at `version`.
///
/// `export` and `import` are also keywords in ES5 modules.
pub fn is_keyword(word: &str, version: EcmaVersion, module: bool) -> bool {
    match TokenType::from_keyword(word) {
        Some(TokenType::Export | TokenType::Import) if module => true,
        Some(ty) => ty.info().ecma_version <= version,
        None => false,
    }
}

/// Words reserved in every context for the given version
pub fn is_reserved_word(word: &str, version: EcmaVersion, module: bool) -> bool {
    let reserved = if version >= EcmaVersion::ES2015 {
        matches!(word, "enum")
    } else if version >= EcmaVersion::ES5 {
        matches!(word, "class" | "enum" | "extends" | "super" | "const" | "export" | "import")
    } else {
        matches!(
            word,
            "abstract" | "boolean" | "byte" | "char" | "class" | "double" | "enum" | "export"
                | "extends" | "final" | "float" | "goto" | "implements" | "import" | "int"
                | "interface" | "long" | "native" | "package" | "private" | "protected"
                | "public" | "short" | "static" | "super" | "synchronized" | "throws"
                | "transient" | "volatile"
        )
    };
    reserved || (module && word == "await")
}

/// Words reserved only in strict mode code
pub fn is_strict_reserved_word(word: &str) -> bool {
    matches!(
        word,
        "implements"
            | "interface"
            | "let"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "static"
            | "yield"
    )
}

/// Words that may not be bound in strict mode code
pub fn is_strict_bind_reserved_word(word: &str) -> bool {
    is_strict_reserved_word(word) || matches!(word, "eval" | "arguments")
}

/// Kind-dependent token payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenValue {
    /// No payload
    None,
    /// Punctuator or keyword text
    Punct(&'static str),
    /// Identifier name, private name, or cooked string value
    Str(String),
    /// Numeric value
    Number(f64),
    /// BigInt value
    BigInt(BigInt),
    /// Regular expression pattern, flags and validation/adaptation result
    RegExp(Box<RegExpValue>),
    /// Template chunk; `cooked` is `None` for chunks with invalid escapes
    Template {
        /// Cooked value
        cooked: Option<String>,
        /// Raw text, with line terminators normalized to `\n`
        raw: String,
    },
}

impl TokenValue {
    /// The string payload, for identifiers, strings and punctuators
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Str(s) => Some(s),
            TokenValue::Punct(s) => Some(s),
            _ => None,
        }
    }
}

/// Payload of a regular expression literal token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegExpValue {
    /// Pattern text between the slashes
    pub pattern: String,
    /// Flag characters
    pub flags: String,
    /// Validation or adaptation outcome; `None` when regex parsing is skipped
    pub result: Option<RegExpParseResult>,
}

/// An immutable token snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// Type of the token
    pub token_type: TokenType,
    /// Payload
    pub value: TokenValue,
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Start/end line and column
    pub loc: SourceLocation,
}

impl Token {
    /// Coarse kind of the token
    pub fn kind(&self) -> TokenKind {
        self.token_type.info().kind
    }

    /// Source text of the token
    pub fn raw<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

/// Kind of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    /// `// ...`, `<!-- ...` or `--> ...`
    Line,
    /// `/* ... */`
    Block,
    /// `#! ...` at the start of the input
    Hashbang,
}

/// A comment reported through the `on_comment` callback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    /// Comment kind
    pub kind: CommentKind,
    /// Text without the comment delimiters
    pub text: String,
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Start/end line and column
    pub loc: SourceLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binop_precedence() {
        assert_eq!(TokenType::LogicalOr.binop(), 1);
        assert_eq!(TokenType::Star.binop(), 10);
        assert_eq!(TokenType::In.binop(), 7);
        assert_eq!(TokenType::Comma.binop(), -1);
        assert_eq!(TokenType::StarStar.binop(), -1);
    }

    #[test]
    fn test_flags() {
        assert!(TokenType::Eq.is_assign());
        assert!(TokenType::IncDec.is_prefix() && TokenType::IncDec.is_postfix());
        assert!(TokenType::Do.is_loop());
        assert!(TokenType::Return.before_expr());
        assert!(!TokenType::ParenR.before_expr());
    }

    #[test]
    fn test_keyword_versions() {
        assert!(is_keyword("const", EcmaVersion::ES2015, false));
        assert!(!is_keyword("const", EcmaVersion::ES5, false));
        assert!(is_keyword("import", EcmaVersion::ES5, true));
        assert!(!is_keyword("let", EcmaVersion::Experimental, false));
    }

    #[test]
    fn test_keyword_round_trip() {
        let versions: Vec<EcmaVersion> = (3..=14)
            .filter_map(EcmaVersion::from_number)
            .chain([EcmaVersion::Experimental])
            .collect();
        assert_eq!(versions.len(), 12);

        for &ty in TokenType::ALL {
            let Some(word) = ty.keyword() else {
                continue;
            };
            assert_eq!(TokenType::from_keyword(word), Some(ty));
            for &version in &versions {
                let expected = ty.info().ecma_version <= version;
                assert_eq!(is_keyword(word, version, false), expected, "{} at {:?}", word, version);
                let in_module = expected || matches!(ty, TokenType::Import | TokenType::Export);
                assert_eq!(is_keyword(word, version, true), in_module, "{} at {:?}", word, version);
            }
        }
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("enum", EcmaVersion::ES2020, false));
        assert!(is_reserved_word("await", EcmaVersion::ES2020, true));
        assert!(!is_reserved_word("await", EcmaVersion::ES2020, false));
        assert!(is_strict_reserved_word("yield"));
        assert!(is_strict_bind_reserved_word("eval"));
    }
}
