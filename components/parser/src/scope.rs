//! Scope and binding tracking
//!
//! The parser keeps a stack of [`Scope`]s while it descends. Declarations
//! are recorded as they are parsed, which is enough to detect conflicting
//! redeclarations and to answer context questions such as "may `await`
//! appear here" without a separate analysis pass.

use bitflags::bitflags;
use tracing::trace;

bitflags! {
    /// What kind of construct opened a scope
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ScopeFlags: u16 {
        /// Program scope
        const TOP = 1 << 0;
        /// Function body (including arrows)
        const FUNCTION = 1 << 1;
        /// Async function
        const ASYNC = 1 << 2;
        /// Generator function
        const GENERATOR = 1 << 3;
        /// Arrow function
        const ARROW = 1 << 4;
        /// `catch (name)` with a plain identifier parameter
        const SIMPLE_CATCH = 1 << 5;
        /// `super.x` is allowed
        const SUPER = 1 << 6;
        /// `super()` is allowed
        const DIRECT_SUPER = 1 << 7;
        /// `static { }` block in a class body
        const CLASS_STATIC_BLOCK = 1 << 8;
        /// Class field initializer
        const CLASS_FIELD_INIT = 1 << 9;

        /// Scopes that own `var` declarations
        const VAR = Self::TOP.bits() | Self::FUNCTION.bits() | Self::CLASS_STATIC_BLOCK.bits();
    }
}

impl ScopeFlags {
    /// Flags of a function scope
    pub fn function(is_async: bool, generator: bool) -> ScopeFlags {
        let mut flags = ScopeFlags::FUNCTION;
        flags.set(ScopeFlags::ASYNC, is_async);
        flags.set(ScopeFlags::GENERATOR, generator);
        flags
    }

    fn owns_var(self) -> bool {
        self.intersects(ScopeFlags::VAR | ScopeFlags::CLASS_FIELD_INIT)
    }
}

/// How a name is being bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingType {
    /// Not a binding (assignment target)
    None,
    /// `var` declaration or sloppy parameter
    Var,
    /// `let`, `const`, `class`, `using`, import bindings
    Lexical,
    /// Function declaration
    Function,
    /// Parameter of `catch (name)`
    SimpleCatch,
    /// Name of a function expression, bound in its own scope
    Outside,
}

/// One entry of the scope stack
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Kind of the scope
    pub flags: ScopeFlags,
    /// Names declared with `var` in or through this scope
    pub var: Vec<String>,
    /// Lexically declared names
    pub lexical: Vec<String>,
    /// Function declarations
    pub functions: Vec<String>,
    var_index: usize,
    this_index: usize,
}

/// Result of recording a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declared {
    /// The name conflicts with an earlier declaration
    pub redeclared: bool,
    /// The declaration landed in the program scope
    pub top_level: bool,
}

/// Stack of open scopes
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    module: bool,
}

impl ScopeStack {
    /// Create an empty stack; `module` changes how top-level functions bind
    pub fn new(module: bool) -> Self {
        Self {
            scopes: Vec::new(),
            module,
        }
    }

    /// Drop every scope and switch between script and module rules
    pub fn reset(&mut self, module: bool) {
        self.scopes.clear();
        self.module = module;
    }

    /// Number of open scopes
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope is open
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Open a scope
    pub fn enter(&mut self, flags: ScopeFlags) {
        let index = self.scopes.len();
        let parent = self.scopes.last();
        let var_index = if flags.owns_var() {
            index
        } else {
            parent.map_or(index, |scope| scope.var_index)
        };
        let this_index = if flags.owns_var() && !flags.contains(ScopeFlags::ARROW) {
            index
        } else {
            parent.map_or(index, |scope| scope.this_index)
        };
        self.scopes.push(Scope {
            flags,
            var_index,
            this_index,
            ..Scope::default()
        });
    }

    /// Close the innermost scope
    pub fn exit(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// Innermost scope
    pub fn current(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// Program scope
    pub fn top(&self) -> Option<&Scope> {
        self.scopes.first()
    }

    /// Nearest scope owning `var` declarations
    pub fn var_scope(&self) -> Option<&Scope> {
        self.scopes
            .last()
            .and_then(|scope| self.scopes.get(scope.var_index))
    }

    /// Nearest scope providing `this`
    pub fn this_scope(&self) -> Option<&Scope> {
        self.scopes
            .last()
            .and_then(|scope| self.scopes.get(scope.this_index))
    }

    fn var_flags(&self) -> ScopeFlags {
        self.var_scope().map_or(ScopeFlags::empty(), |scope| scope.flags)
    }

    fn this_flags(&self) -> ScopeFlags {
        self.this_scope().map_or(ScopeFlags::empty(), |scope| scope.flags)
    }

    /// Inside a (non-arrow or arrow) function body
    pub fn in_function(&self) -> bool {
        self.var_flags().contains(ScopeFlags::FUNCTION)
    }

    /// Inside a generator function body
    pub fn in_generator(&self) -> bool {
        self.var_flags().contains(ScopeFlags::GENERATOR)
    }

    /// Inside an async function body
    pub fn in_async(&self) -> bool {
        self.var_flags().contains(ScopeFlags::ASYNC)
    }

    /// Inside a class static block
    pub fn in_class_static_block(&self) -> bool {
        self.var_flags().contains(ScopeFlags::CLASS_STATIC_BLOCK)
    }

    /// Inside a class field initializer, looking through arrows
    pub fn in_class_field_init(&self) -> bool {
        self.this_flags().contains(ScopeFlags::CLASS_FIELD_INIT)
    }

    /// `await` is an operator here.
    ///
    /// `None` means no function, static block or field initializer encloses
    /// the position; the caller decides based on top-level rules.
    pub fn can_await(&self) -> Option<bool> {
        let flags = self.var_flags();
        if flags.intersects(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::CLASS_FIELD_INIT) {
            Some(false)
        } else if flags.contains(ScopeFlags::FUNCTION) {
            Some(flags.contains(ScopeFlags::ASYNC))
        } else {
            None
        }
    }

    /// `super.x` is allowed here
    pub fn allow_super(&self) -> bool {
        self.this_flags().contains(ScopeFlags::SUPER)
    }

    /// `super()` is allowed here
    pub fn allow_direct_super(&self) -> bool {
        self.this_flags().contains(ScopeFlags::DIRECT_SUPER)
    }

    /// `new.target` is allowed here
    pub fn allow_new_target(&self) -> bool {
        // The `this` scope of a function is never an arrow.
        self.this_flags().intersects(
            ScopeFlags::FUNCTION | ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::CLASS_FIELD_INIT,
        )
    }

    fn functions_as_var(&self, scope: &Scope) -> bool {
        scope.flags.contains(ScopeFlags::FUNCTION)
            || (!self.module && scope.flags.contains(ScopeFlags::TOP))
    }

    /// Function declarations in the current scope behave like `var`
    pub fn treat_functions_as_var(&self) -> bool {
        self.current()
            .is_some_and(|scope| self.functions_as_var(scope))
    }

    /// Record a declaration of `name`
    pub fn declare(&mut self, name: &str, binding: BindingType) -> Declared {
        let treat_functions_as_var = self.treat_functions_as_var();
        let Some(current) = self.scopes.len().checked_sub(1) else {
            return Declared {
                redeclared: false,
                top_level: false,
            };
        };
        let owned = name.to_string();
        let mut redeclared = false;
        let mut top_level = false;
        match binding {
            BindingType::Lexical => {
                let scope = &mut self.scopes[current];
                redeclared = contains(&scope.lexical, name)
                    || contains(&scope.functions, name)
                    || contains(&scope.var, name);
                scope.lexical.push(owned);
                top_level = scope.flags.contains(ScopeFlags::TOP);
            }
            BindingType::SimpleCatch => {
                self.scopes[current].lexical.push(owned);
            }
            BindingType::Function => {
                let scope = &mut self.scopes[current];
                redeclared = if treat_functions_as_var {
                    contains(&scope.lexical, name)
                } else {
                    contains(&scope.lexical, name) || contains(&scope.var, name)
                };
                scope.functions.push(owned);
            }
            BindingType::Var => {
                for index in (0..=current).rev() {
                    let scope = &self.scopes[index];
                    let catch_param = scope.flags.contains(ScopeFlags::SIMPLE_CATCH)
                        && scope.lexical.first().map(String::as_str) == Some(name);
                    if (contains(&scope.lexical, name) && !catch_param)
                        || (!self.functions_as_var(scope) && contains(&scope.functions, name))
                    {
                        redeclared = true;
                        break;
                    }
                    let scope = &mut self.scopes[index];
                    scope.var.push(owned.clone());
                    if scope.flags.contains(ScopeFlags::TOP) {
                        top_level = true;
                    }
                    if scope.flags.intersects(ScopeFlags::VAR) {
                        break;
                    }
                }
            }
            BindingType::None | BindingType::Outside => {}
        }
        if redeclared {
            trace!(name, ?binding, "redeclaration");
        }
        Declared {
            redeclared,
            top_level,
        }
    }

    /// Whether the program scope declares `name` with `var` or lexically
    pub fn top_level_declares(&self, name: &str) -> bool {
        self.top()
            .is_some_and(|scope| contains(&scope.lexical, name) || contains(&scope.var, name))
    }
}

fn contains(names: &[String], name: &str) -> bool {
    names.iter().any(|known| known == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script() -> ScopeStack {
        let mut stack = ScopeStack::new(false);
        stack.enter(ScopeFlags::TOP);
        stack
    }

    #[test]
    fn test_var_hoists_to_function_scope() {
        let mut stack = script();
        stack.enter(ScopeFlags::function(false, false));
        stack.enter(ScopeFlags::empty());
        assert!(!stack.declare("x", BindingType::Var).redeclared);
        assert!(contains(&stack.current().unwrap().var, "x"));
        stack.exit();
        assert!(contains(&stack.current().unwrap().var, "x"));
        stack.exit();
        assert!(!contains(&stack.current().unwrap().var, "x"));
    }

    #[test]
    fn test_let_stays_in_block() {
        let mut stack = script();
        stack.enter(ScopeFlags::empty());
        stack.declare("y", BindingType::Lexical);
        stack.exit();
        assert!(!stack.top_level_declares("y"));
        assert!(!stack.declare("y", BindingType::Lexical).redeclared);
    }

    #[test]
    fn test_lexical_conflicts() {
        let mut stack = script();
        stack.declare("a", BindingType::Lexical);
        assert!(stack.declare("a", BindingType::Lexical).redeclared);
        assert!(stack.declare("a", BindingType::Var).redeclared);

        stack.declare("b", BindingType::Var);
        assert!(stack.declare("b", BindingType::Lexical).redeclared);
    }

    #[test]
    fn test_var_conflicts_with_inner_let() {
        let mut stack = script();
        stack.enter(ScopeFlags::empty());
        stack.declare("z", BindingType::Lexical);
        stack.enter(ScopeFlags::empty());
        assert!(stack.declare("z", BindingType::Var).redeclared);
    }

    #[test]
    fn test_simple_catch_parameter_allows_var() {
        let mut stack = script();
        stack.enter(ScopeFlags::SIMPLE_CATCH);
        stack.declare("e", BindingType::SimpleCatch);
        assert!(!stack.declare("e", BindingType::Var).redeclared);
    }

    #[test]
    fn test_functions_at_script_top_behave_like_var() {
        let mut stack = script();
        stack.declare("f", BindingType::Function);
        assert!(!stack.declare("f", BindingType::Function).redeclared);
        assert!(!stack.declare("f", BindingType::Var).redeclared);

        let mut module = ScopeStack::new(true);
        module.enter(ScopeFlags::TOP);
        module.declare("f", BindingType::Function);
        assert!(module.declare("f", BindingType::Var).redeclared);
    }

    #[test]
    fn test_functions_in_blocks_are_lexical() {
        let mut stack = script();
        stack.enter(ScopeFlags::empty());
        stack.declare("g", BindingType::Function);
        assert!(stack.declare("g", BindingType::Lexical).redeclared);
    }

    #[test]
    fn test_cached_scope_indices() {
        let mut stack = script();
        stack.enter(ScopeFlags::function(true, false) | ScopeFlags::SUPER);
        stack.enter(ScopeFlags::function(false, false) | ScopeFlags::ARROW);
        stack.enter(ScopeFlags::empty());
        assert!(stack.in_function());
        assert!(!stack.in_async());
        assert!(stack.allow_super());
        assert!(stack.allow_new_target());
        assert_eq!(stack.can_await(), Some(false));
    }

    #[test]
    fn test_await_and_new_target_through_arrows() {
        let mut stack = script();
        stack.enter(ScopeFlags::CLASS_FIELD_INIT);
        stack.enter(ScopeFlags::function(true, false) | ScopeFlags::ARROW);
        assert_eq!(stack.can_await(), Some(true));
        assert!(stack.allow_new_target());
        stack.exit();
        stack.exit();

        stack.enter(ScopeFlags::function(false, false) | ScopeFlags::ARROW);
        stack.enter(ScopeFlags::empty());
        assert_eq!(stack.can_await(), Some(false));
        assert!(!stack.allow_new_target());
    }

    #[test]
    fn test_top_level_context() {
        let stack = script();
        assert!(!stack.in_function());
        assert!(!stack.allow_new_target());
        assert_eq!(stack.can_await(), None);
    }

    #[test]
    fn test_static_block_context() {
        let mut stack = script();
        stack.enter(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::SUPER);
        assert!(stack.in_class_static_block());
        assert_eq!(stack.can_await(), Some(false));
        assert!(stack.allow_new_target());
        assert!(!stack.declare("v", BindingType::Var).top_level);
    }
}
