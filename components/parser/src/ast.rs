//! Abstract Syntax Tree node definitions
//!
//! Nodes follow the ESTree shape: every node carries its byte range and
//! line/column location, and a [`NodeKind`] describing what it is.
//! Serialization produces ESTree-like JSON with a `type` tag.

use crate::options::SourceType;
use crate::token::RegExpValue;
use core_types::SourceLocation;
use serde::Serialize;

/// An AST node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Line/column span
    pub loc: SourceLocation,
    /// What the node is
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    /// Create a node
    pub fn new(start: usize, end: usize, loc: SourceLocation, kind: NodeKind) -> Self {
        Self {
            start,
            end,
            loc,
            kind,
        }
    }

    /// ESTree type name of the node
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Identifier name, for `Identifier` nodes
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Whether the node is a string literal
    pub fn is_string_literal(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Literal {
                value: LiteralValue::String(_),
                ..
            }
        )
    }

    /// Take the node's kind, leaving an `EmptyStatement` behind
    pub fn into_kind(mut self) -> NodeKind {
        std::mem::replace(&mut self.kind, NodeKind::EmptyStatement)
    }
}

impl Drop for Node {
    // Children are detached onto a heap worklist so that dropping a long
    // left-nested chain never recurses once per link.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        std::mem::replace(&mut self.kind, NodeKind::EmptyStatement).into_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            std::mem::replace(&mut node.kind, NodeKind::EmptyStatement)
                .into_children(&mut pending);
        }
    }
}

/// Value of a literal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// String literal (cooked)
    String(String),
    /// Numeric literal
    Number(f64),
    /// BigInt literal, as decimal digits
    BigInt(String),
    /// Regular expression literal
    RegExp(Box<RegExpValue>),
}

/// Kind of a variable declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
    /// `using`
    Using,
    /// `await using`
    #[serde(rename = "await using")]
    AwaitUsing,
}

impl VariableKind {
    /// Source keyword(s)
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
            VariableKind::Using => "using",
            VariableKind::AwaitUsing => "await using",
        }
    }
}

/// Kind of an object literal property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    /// Data property or method
    Init,
    /// Getter
    Get,
    /// Setter
    Set,
}

/// Kind of a class method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodKind {
    /// The class constructor
    Constructor,
    /// Ordinary method
    Method,
    /// Getter
    Get,
    /// Setter
    Set,
}

/// Shared fields of function declarations, expressions and arrows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    /// Function name
    pub id: Option<Box<Node>>,
    /// Parameters (patterns)
    pub params: Vec<Node>,
    /// Body: a `BlockStatement`, or an expression for concise arrows
    pub body: Box<Node>,
    /// `function*`
    pub generator: bool,
    /// `async`
    #[serde(rename = "async")]
    pub is_async: bool,
    /// Concise arrow body
    pub expression: bool,
}

/// Shared fields of class declarations and expressions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Class {
    /// Class name
    pub id: Option<Box<Node>>,
    /// `extends` clause
    pub super_class: Option<Box<Node>>,
    /// `ClassBody` node
    pub body: Box<Node>,
    /// Decorators applied to the class
    pub decorators: Vec<Node>,
}

/// Cooked and raw text of a template chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateValue {
    /// Cooked text; `None` when the chunk has an invalid escape
    pub cooked: Option<String>,
    /// Raw text
    pub raw: String,
}

/// Every kind of AST node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Complete program
    Program {
        /// Script or module
        #[serde(rename = "sourceType")]
        source_type: SourceType,
        /// Top-level statements
        body: Vec<Node>,
    },

    /// Identifier reference or binding
    Identifier {
        /// Name
        name: String,
    },
    /// `#name`
    PrivateIdentifier {
        /// Name without the `#`
        name: String,
    },
    /// Literal value
    Literal {
        /// Value
        value: LiteralValue,
        /// Source text
        raw: String,
    },

    /// Expression statement, or a directive of a prologue
    ExpressionStatement {
        /// The expression
        expression: Box<Node>,
        /// Raw directive text without quotes, for prologue entries
        directive: Option<String>,
    },
    /// `{ ... }`
    BlockStatement {
        /// Statements
        body: Vec<Node>,
    },
    /// `static { ... }` in a class body
    StaticBlock {
        /// Statements
        body: Vec<Node>,
    },
    /// `;`
    EmptyStatement,
    /// `debugger;`
    DebuggerStatement,
    /// `with (object) body`
    WithStatement {
        /// Scope object
        object: Box<Node>,
        /// Body
        body: Box<Node>,
    },
    /// `return`
    ReturnStatement {
        /// Returned value
        argument: Option<Box<Node>>,
    },
    /// `label: body`
    LabeledStatement {
        /// Label
        label: Box<Node>,
        /// Labeled statement
        body: Box<Node>,
    },
    /// `break`
    BreakStatement {
        /// Target label
        label: Option<Box<Node>>,
    },
    /// `continue`
    ContinueStatement {
        /// Target label
        label: Option<Box<Node>>,
    },
    /// `if`
    IfStatement {
        /// Condition
        test: Box<Node>,
        /// Then branch
        consequent: Box<Node>,
        /// Else branch
        alternate: Option<Box<Node>>,
    },
    /// `switch`
    SwitchStatement {
        /// Switched value
        discriminant: Box<Node>,
        /// `SwitchCase` nodes
        cases: Vec<Node>,
    },
    /// `case test:` or `default:`
    SwitchCase {
        /// Case value; `None` for `default`
        test: Option<Box<Node>>,
        /// Statements
        consequent: Vec<Node>,
    },
    /// `throw`
    ThrowStatement {
        /// Thrown value
        argument: Box<Node>,
    },
    /// `try`
    TryStatement {
        /// Protected block
        block: Box<Node>,
        /// `CatchClause`
        handler: Option<Box<Node>>,
        /// `finally` block
        finalizer: Option<Box<Node>>,
    },
    /// `catch (param) body`
    CatchClause {
        /// Bound pattern, absent for `catch {}`
        param: Option<Box<Node>>,
        /// Handler block
        body: Box<Node>,
    },
    /// `while`
    WhileStatement {
        /// Condition
        test: Box<Node>,
        /// Body
        body: Box<Node>,
    },
    /// `do ... while`
    DoWhileStatement {
        /// Body
        body: Box<Node>,
        /// Condition
        test: Box<Node>,
    },
    /// `for (init; test; update)`
    ForStatement {
        /// Initializer
        init: Option<Box<Node>>,
        /// Condition
        test: Option<Box<Node>>,
        /// Update expression
        update: Option<Box<Node>>,
        /// Body
        body: Box<Node>,
    },
    /// `for (left in right)`
    ForInStatement {
        /// Declaration or assignment target
        left: Box<Node>,
        /// Enumerated object
        right: Box<Node>,
        /// Body
        body: Box<Node>,
    },
    /// `for (left of right)` and `for await`
    ForOfStatement {
        /// Declaration or assignment target
        left: Box<Node>,
        /// Iterated value
        right: Box<Node>,
        /// Body
        body: Box<Node>,
        /// `for await`
        #[serde(rename = "await")]
        is_await: bool,
    },
    /// `function name() {}` as a statement
    FunctionDeclaration(Function),
    /// `var`, `let`, `const`, `using`
    VariableDeclaration {
        /// Declaration keyword
        kind: VariableKind,
        /// `VariableDeclarator` nodes
        declarations: Vec<Node>,
    },
    /// `id = init` inside a declaration
    VariableDeclarator {
        /// Bound pattern
        id: Box<Node>,
        /// Initializer
        init: Option<Box<Node>>,
    },

    /// `this`
    ThisExpression,
    /// `super`
    Super,
    /// `[a, , b]`
    ArrayExpression {
        /// Elements; `None` for holes
        elements: Vec<Option<Node>>,
    },
    /// `{ a, b: c }`
    ObjectExpression {
        /// `Property` and `SpreadElement` nodes
        properties: Vec<Node>,
    },
    /// Object literal or object pattern property
    Property {
        /// Key
        key: Box<Node>,
        /// Value (a pattern inside object patterns)
        value: Box<Node>,
        /// Data, getter or setter
        kind: PropertyKind,
        /// `m() {}`
        method: bool,
        /// `{ a }`
        shorthand: bool,
        /// `[key]: value`
        computed: bool,
    },
    /// `function () {}` as an expression
    FunctionExpression(Function),
    /// `() => {}`
    ArrowFunctionExpression(Function),
    /// Prefix operator other than `++`/`--`
    UnaryExpression {
        /// Operator text
        operator: String,
        /// Always true
        prefix: bool,
        /// Operand
        argument: Box<Node>,
    },
    /// `++` / `--`
    UpdateExpression {
        /// Operator text
        operator: String,
        /// Prefix form
        prefix: bool,
        /// Operand
        argument: Box<Node>,
    },
    /// Binary operator
    BinaryExpression {
        /// Operator text
        operator: String,
        /// Left operand (a `PrivateIdentifier` for `#x in obj`)
        left: Box<Node>,
        /// Right operand
        right: Box<Node>,
    },
    /// Assignment, including compound and logical assignment
    AssignmentExpression {
        /// Operator text
        operator: String,
        /// Target
        left: Box<Node>,
        /// Value
        right: Box<Node>,
    },
    /// `&&`, `||`, `??`
    LogicalExpression {
        /// Operator text
        operator: String,
        /// Left operand
        left: Box<Node>,
        /// Right operand
        right: Box<Node>,
    },
    /// `a.b`, `a[b]`, `a?.b`
    MemberExpression {
        /// Object
        object: Box<Node>,
        /// Property
        property: Box<Node>,
        /// `a[b]`
        computed: bool,
        /// `a?.b`
        optional: bool,
    },
    /// Wrapper around an optional chain
    ChainExpression {
        /// Chain
        expression: Box<Node>,
    },
    /// `test ? consequent : alternate`
    ConditionalExpression {
        /// Condition
        test: Box<Node>,
        /// Value when true
        consequent: Box<Node>,
        /// Value when false
        alternate: Box<Node>,
    },
    /// `callee(arguments)`
    CallExpression {
        /// Callee
        callee: Box<Node>,
        /// Arguments
        arguments: Vec<Node>,
        /// `f?.()`
        optional: bool,
    },
    /// `new callee(arguments)`
    NewExpression {
        /// Constructor
        callee: Box<Node>,
        /// Arguments
        arguments: Vec<Node>,
    },
    /// `a, b`
    SequenceExpression {
        /// Expressions
        expressions: Vec<Node>,
    },
    /// `yield` / `yield*`
    YieldExpression {
        /// Yielded value
        argument: Option<Box<Node>>,
        /// `yield*`
        delegate: bool,
    },
    /// `await`
    AwaitExpression {
        /// Awaited value
        argument: Box<Node>,
    },
    /// `` `a${b}c` ``
    TemplateLiteral {
        /// `TemplateElement` nodes
        quasis: Vec<Node>,
        /// Substitutions
        expressions: Vec<Node>,
    },
    /// `` tag`...` ``
    TaggedTemplateExpression {
        /// Tag
        tag: Box<Node>,
        /// `TemplateLiteral`
        quasi: Box<Node>,
    },
    /// Literal chunk of a template
    TemplateElement {
        /// Cooked and raw text
        value: TemplateValue,
        /// Last chunk
        tail: bool,
    },
    /// `...argument` in an expression
    SpreadElement {
        /// Spread value
        argument: Box<Node>,
    },
    /// `(expression)`, only with `preserve_parens`
    ParenthesizedExpression {
        /// Inner expression
        expression: Box<Node>,
    },
    /// `new.target`, `import.meta`
    MetaProperty {
        /// `new` / `import`
        meta: Box<Node>,
        /// `target` / `meta`
        property: Box<Node>,
    },
    /// `import(source, options)`
    ImportExpression {
        /// Module specifier
        source: Box<Node>,
        /// Options argument
        options: Option<Box<Node>>,
    },

    /// `{ a, b: c }` as a pattern
    ObjectPattern {
        /// `Property` and `RestElement` nodes
        properties: Vec<Node>,
    },
    /// `[a, , b]` as a pattern
    ArrayPattern {
        /// Elements; `None` for holes
        elements: Vec<Option<Node>>,
    },
    /// `...argument` in a pattern
    RestElement {
        /// Target
        argument: Box<Node>,
    },
    /// `left = right` in a pattern
    AssignmentPattern {
        /// Target
        left: Box<Node>,
        /// Default value
        right: Box<Node>,
    },

    /// `class Name {}` as a statement
    ClassDeclaration(Class),
    /// `class {}` as an expression
    ClassExpression(Class),
    /// `{ ... }` of a class
    ClassBody {
        /// Members
        body: Vec<Node>,
    },
    /// Class method, getter, setter or constructor
    MethodDefinition {
        /// Key
        key: Box<Node>,
        /// `FunctionExpression`
        value: Box<Node>,
        /// Method kind
        kind: MethodKind,
        /// `[key]() {}`
        computed: bool,
        /// `static`
        #[serde(rename = "static")]
        is_static: bool,
        /// Decorators
        decorators: Vec<Node>,
    },
    /// Class field
    PropertyDefinition {
        /// Key
        key: Box<Node>,
        /// Initializer
        value: Option<Box<Node>>,
        /// `[key] = value`
        computed: bool,
        /// `static`
        #[serde(rename = "static")]
        is_static: bool,
        /// Decorators
        decorators: Vec<Node>,
    },
    /// `@expression`
    Decorator {
        /// Decorator expression
        expression: Box<Node>,
    },

    /// `import ... from "source"`
    ImportDeclaration {
        /// Import specifiers
        specifiers: Vec<Node>,
        /// Module specifier
        source: Box<Node>,
        /// `with { ... }` entries
        attributes: Vec<Node>,
    },
    /// `{ imported as local }`
    ImportSpecifier {
        /// Exported name in the source module
        imported: Box<Node>,
        /// Local binding
        local: Box<Node>,
    },
    /// `import local from`
    ImportDefaultSpecifier {
        /// Local binding
        local: Box<Node>,
    },
    /// `import * as local from`
    ImportNamespaceSpecifier {
        /// Local binding
        local: Box<Node>,
    },
    /// `key: "value"` of an import attribute list
    ImportAttribute {
        /// Attribute name
        key: Box<Node>,
        /// Attribute value
        value: Box<Node>,
    },
    /// `export { ... }`, `export declaration`
    ExportNamedDeclaration {
        /// Exported declaration
        declaration: Option<Box<Node>>,
        /// Export specifiers
        specifiers: Vec<Node>,
        /// Re-export source
        source: Option<Box<Node>>,
        /// `with { ... }` entries
        attributes: Vec<Node>,
    },
    /// `{ local as exported }`
    ExportSpecifier {
        /// Local name (or name in the source module)
        local: Box<Node>,
        /// Exported name
        exported: Box<Node>,
    },
    /// `export default ...`
    ExportDefaultDeclaration {
        /// Declaration or expression
        declaration: Box<Node>,
    },
    /// `export * from` / `export * as name from`
    ExportAllDeclaration {
        /// Namespace export name
        exported: Option<Box<Node>>,
        /// Module specifier
        source: Box<Node>,
        /// `with { ... }` entries
        attributes: Vec<Node>,
    },
}

fn push(out: &mut Vec<Node>, node: Box<Node>) {
    out.push(*node);
}

fn push_opt(out: &mut Vec<Node>, node: Option<Box<Node>>) {
    if let Some(node) = node {
        out.push(*node);
    }
}

impl Function {
    fn into_children(self, out: &mut Vec<Node>) {
        push_opt(out, self.id);
        out.extend(self.params);
        push(out, self.body);
    }
}

impl Class {
    fn into_children(self, out: &mut Vec<Node>) {
        push_opt(out, self.id);
        push_opt(out, self.super_class);
        push(out, self.body);
        out.extend(self.decorators);
    }
}

impl NodeKind {
    /// Move every direct child node into `out`
    fn into_children(self, out: &mut Vec<Node>) {
        match self {
            NodeKind::Identifier { .. }
            | NodeKind::PrivateIdentifier { .. }
            | NodeKind::Literal { .. }
            | NodeKind::EmptyStatement
            | NodeKind::DebuggerStatement
            | NodeKind::ThisExpression
            | NodeKind::Super
            | NodeKind::TemplateElement { .. } => {}
            NodeKind::Program { body, .. }
            | NodeKind::BlockStatement { body }
            | NodeKind::StaticBlock { body }
            | NodeKind::ClassBody { body } => out.extend(body),
            NodeKind::VariableDeclaration { declarations, .. } => out.extend(declarations),
            NodeKind::SequenceExpression { expressions } => out.extend(expressions),
            NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
                out.extend(properties)
            }
            NodeKind::ArrayExpression { elements } | NodeKind::ArrayPattern { elements } => {
                out.extend(elements.into_iter().flatten())
            }
            NodeKind::ExpressionStatement { expression, .. }
            | NodeKind::ChainExpression { expression }
            | NodeKind::ParenthesizedExpression { expression }
            | NodeKind::Decorator { expression } => push(out, expression),
            NodeKind::ThrowStatement { argument }
            | NodeKind::UnaryExpression { argument, .. }
            | NodeKind::UpdateExpression { argument, .. }
            | NodeKind::AwaitExpression { argument }
            | NodeKind::SpreadElement { argument }
            | NodeKind::RestElement { argument } => push(out, argument),
            NodeKind::ReturnStatement { argument } | NodeKind::YieldExpression { argument, .. } => {
                push_opt(out, argument)
            }
            NodeKind::BreakStatement { label } | NodeKind::ContinueStatement { label } => {
                push_opt(out, label)
            }
            NodeKind::WithStatement { object, body } => {
                push(out, object);
                push(out, body);
            }
            NodeKind::LabeledStatement { label, body } => {
                push(out, label);
                push(out, body);
            }
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                push(out, test);
                push(out, consequent);
                push_opt(out, alternate);
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                push(out, discriminant);
                out.extend(cases);
            }
            NodeKind::SwitchCase { test, consequent } => {
                push_opt(out, test);
                out.extend(consequent);
            }
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                push(out, block);
                push_opt(out, handler);
                push_opt(out, finalizer);
            }
            NodeKind::CatchClause { param, body } => {
                push_opt(out, param);
                push(out, body);
            }
            NodeKind::WhileStatement { test, body } | NodeKind::DoWhileStatement { body, test } => {
                push(out, test);
                push(out, body);
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                push_opt(out, init);
                push_opt(out, test);
                push_opt(out, update);
                push(out, body);
            }
            NodeKind::ForInStatement { left, right, body }
            | NodeKind::ForOfStatement {
                left, right, body, ..
            } => {
                push(out, left);
                push(out, right);
                push(out, body);
            }
            NodeKind::FunctionDeclaration(function)
            | NodeKind::FunctionExpression(function)
            | NodeKind::ArrowFunctionExpression(function) => function.into_children(out),
            NodeKind::ClassDeclaration(class) | NodeKind::ClassExpression(class) => {
                class.into_children(out)
            }
            NodeKind::VariableDeclarator { id, init } => {
                push(out, id);
                push_opt(out, init);
            }
            NodeKind::Property { key, value, .. } | NodeKind::ImportAttribute { key, value } => {
                push(out, key);
                push(out, value);
            }
            NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::AssignmentPattern { left, right } => {
                push(out, left);
                push(out, right);
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => {
                push(out, object);
                push(out, property);
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                push(out, test);
                push(out, consequent);
                push(out, alternate);
            }
            NodeKind::CallExpression {
                callee, arguments, ..
            }
            | NodeKind::NewExpression { callee, arguments } => {
                push(out, callee);
                out.extend(arguments);
            }
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            } => {
                out.extend(quasis);
                out.extend(expressions);
            }
            NodeKind::TaggedTemplateExpression { tag, quasi } => {
                push(out, tag);
                push(out, quasi);
            }
            NodeKind::MetaProperty { meta, property } => {
                push(out, meta);
                push(out, property);
            }
            NodeKind::ImportExpression { source, options } => {
                push(out, source);
                push_opt(out, options);
            }
            NodeKind::MethodDefinition {
                key,
                value,
                decorators,
                ..
            } => {
                push(out, key);
                push(out, value);
                out.extend(decorators);
            }
            NodeKind::PropertyDefinition {
                key,
                value,
                decorators,
                ..
            } => {
                push(out, key);
                push_opt(out, value);
                out.extend(decorators);
            }
            NodeKind::ImportDeclaration {
                specifiers,
                source,
                attributes,
            } => {
                out.extend(specifiers);
                push(out, source);
                out.extend(attributes);
            }
            NodeKind::ImportSpecifier { imported, local } => {
                push(out, imported);
                push(out, local);
            }
            NodeKind::ImportDefaultSpecifier { local }
            | NodeKind::ImportNamespaceSpecifier { local } => push(out, local),
            NodeKind::ExportNamedDeclaration {
                declaration,
                specifiers,
                source,
                attributes,
            } => {
                push_opt(out, declaration);
                out.extend(specifiers);
                push_opt(out, source);
                out.extend(attributes);
            }
            NodeKind::ExportSpecifier { local, exported } => {
                push(out, local);
                push(out, exported);
            }
            NodeKind::ExportDefaultDeclaration { declaration } => push(out, declaration),
            NodeKind::ExportAllDeclaration {
                exported,
                source,
                attributes,
            } => {
                push_opt(out, exported);
                push(out, source);
                out.extend(attributes);
            }
        }
    }

    /// ESTree type name
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::PrivateIdentifier { .. } => "PrivateIdentifier",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::StaticBlock { .. } => "StaticBlock",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::DebuggerStatement => "DebuggerStatement",
            NodeKind::WithStatement { .. } => "WithStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::LabeledStatement { .. } => "LabeledStatement",
            NodeKind::BreakStatement { .. } => "BreakStatement",
            NodeKind::ContinueStatement { .. } => "ContinueStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::ForOfStatement { .. } => "ForOfStatement",
            NodeKind::FunctionDeclaration(_) => "FunctionDeclaration",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::Super => "Super",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::FunctionExpression(_) => "FunctionExpression",
            NodeKind::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::ChainExpression { .. } => "ChainExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::SequenceExpression { .. } => "SequenceExpression",
            NodeKind::YieldExpression { .. } => "YieldExpression",
            NodeKind::AwaitExpression { .. } => "AwaitExpression",
            NodeKind::TemplateLiteral { .. } => "TemplateLiteral",
            NodeKind::TaggedTemplateExpression { .. } => "TaggedTemplateExpression",
            NodeKind::TemplateElement { .. } => "TemplateElement",
            NodeKind::SpreadElement { .. } => "SpreadElement",
            NodeKind::ParenthesizedExpression { .. } => "ParenthesizedExpression",
            NodeKind::MetaProperty { .. } => "MetaProperty",
            NodeKind::ImportExpression { .. } => "ImportExpression",
            NodeKind::ObjectPattern { .. } => "ObjectPattern",
            NodeKind::ArrayPattern { .. } => "ArrayPattern",
            NodeKind::RestElement { .. } => "RestElement",
            NodeKind::AssignmentPattern { .. } => "AssignmentPattern",
            NodeKind::ClassDeclaration(_) => "ClassDeclaration",
            NodeKind::ClassExpression(_) => "ClassExpression",
            NodeKind::ClassBody { .. } => "ClassBody",
            NodeKind::MethodDefinition { .. } => "MethodDefinition",
            NodeKind::PropertyDefinition { .. } => "PropertyDefinition",
            NodeKind::Decorator { .. } => "Decorator",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::ImportSpecifier { .. } => "ImportSpecifier",
            NodeKind::ImportDefaultSpecifier { .. } => "ImportDefaultSpecifier",
            NodeKind::ImportNamespaceSpecifier { .. } => "ImportNamespaceSpecifier",
            NodeKind::ImportAttribute { .. } => "ImportAttribute",
            NodeKind::ExportNamedDeclaration { .. } => "ExportNamedDeclaration",
            NodeKind::ExportSpecifier { .. } => "ExportSpecifier",
            NodeKind::ExportDefaultDeclaration { .. } => "ExportDefaultDeclaration",
            NodeKind::ExportAllDeclaration { .. } => "ExportAllDeclaration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Node {
        Node::new(
            0,
            name.len(),
            SourceLocation::default(),
            NodeKind::Identifier {
                name: name.to_string(),
            },
        )
    }

    #[test]
    fn test_identifier_helpers() {
        let node = ident("x");
        assert_eq!(node.identifier_name(), Some("x"));
        assert_eq!(node.type_name(), "Identifier");
        assert!(!node.is_string_literal());
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let node = ident("answer");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "Identifier");
        assert_eq!(json["name"], "answer");
        assert_eq!(json["start"], 0);
    }

    #[test]
    fn test_deep_tree_drops_iteratively() {
        let mut node = ident("x");
        for _ in 0..200_000 {
            node = Node::new(
                0,
                1,
                SourceLocation::default(),
                NodeKind::UnaryExpression {
                    operator: "!".to_string(),
                    prefix: true,
                    argument: Box::new(node),
                },
            );
        }
        drop(node);
    }

    #[test]
    fn test_into_kind() {
        let kind = ident("y").into_kind();
        assert_eq!(kind.type_name(), "Identifier");
    }

    #[test]
    fn test_variable_kind_text() {
        assert_eq!(VariableKind::AwaitUsing.as_str(), "await using");
        let json = serde_json::to_value(VariableKind::Const).unwrap();
        assert_eq!(json, "const");
    }
}
