use std::{cell::RefCell, rc::Rc};

use crate::{
    builtin::Builtin,
    environment::Environment,
    error::RuntimeError,
    object::{Array, Function, Map, Object, ObjectType},
};

use monke_parser::{
    ast::{BlockStatement, Expression, IdentifierLiteral, IfExpression, MapLiteral, Program, Statement},
    token::TokenKind,
};

/// Tree-walking evaluator.
///
/// Errors are ordinary [`Object::Error`] values: every step checks the
/// result of its sub-evaluations and hands an error straight back up.
pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())))
    }

    pub fn new_with_env(env: Rc<RefCell<Environment>>) -> Self {
        Evaluator { env }
    }

    /// Evaluate a whole program. `None` only for a program without statements.
    pub fn eval(&mut self, prog: &Program) -> Option<Rc<Object>> {
        let mut result = None;

        for stmt in &prog.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                // If a return value is found, immediately return and stop evaluating statements
                // Unwrap the return value into a final value so the program can use it
                Object::ReturnValue(inner_value) => return Some(Rc::clone(inner_value)),
                Object::Error(err) => {
                    tracing::debug!(error = %err, "evaluation stopped");
                    return Some(val);
                }
                _ => result = Some(val),
            }
        }

        result
    }

    // Similar to eval (for programs) but doesn't unwrap return values
    fn eval_block_statement(&mut self, block: &BlockStatement) -> Rc<Object> {
        let mut result = Object::null();

        for stmt in &block.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                // Don't unwrap the return value, we might be in a nested block which also needs to return
                Object::ReturnValue(_) | Object::Error(_) => return val,
                _ => result = val,
            }
        }

        result
    }

    fn eval_statement(&mut self, stmt: &Statement) -> Rc<Object> {
        match stmt {
            Statement::Expression { expression } => self.eval_expression(expression),
            Statement::Return { value } => {
                let obj = self.eval_expression(value);

                // Errors and nested returns already bubble up, no need to wrap them again
                if obj.is_return_or_error() {
                    return obj;
                }

                Rc::new(Object::ReturnValue(obj))
            }
            Statement::Let { name, value } => {
                let obj = self.eval_expression(value);
                // Early return the first error received
                if obj.is_return_or_error() {
                    return obj;
                }

                self.env.borrow_mut().set(name.name.clone(), obj);

                Object::null()
            }
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> Rc<Object> {
        match expr {
            Expression::Integer(value) => Rc::new(Object::Integer(*value)),
            Expression::String(value) => Rc::new(Object::String(value.clone())),
            Expression::Boolean(value) => Object::native_bool(*value),
            Expression::Identifier(identifier) => self.eval_identifier_expression(identifier),

            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right);
                // Early return the first error received
                if right.is_return_or_error() {
                    return right;
                }
                self.eval_prefix_expression(prefix.operator, right)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left);
                // Early return the first error received
                if left.is_return_or_error() {
                    return left;
                }
                let right = self.eval_expression(&infix.right);
                if right.is_return_or_error() {
                    return right;
                }
                self.eval_infix_expression(infix.operator, left, right)
            }

            Expression::If(if_expr) => self.eval_if_expression(if_expr),

            Expression::Function(func) => Rc::new(Object::Function(Function {
                parameters: func.parameters.clone(),
                body: Rc::clone(&func.body),
                env: Rc::clone(&self.env),
            })),
            Expression::Call(call) => {
                let func = self.eval_expression(&call.function);
                // Early return the first error received
                if func.is_return_or_error() {
                    return func;
                }
                let args = match self.eval_expressions(&call.arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };

                self.apply_function(func, args)
            }

            Expression::Array(arr) => match self.eval_expressions(&arr.elements) {
                Ok(elements) => Rc::new(Object::Array(Array { elements })),
                Err(err) => err,
            },
            Expression::Index(expr) => {
                let left = self.eval_expression(&expr.left);
                if left.is_return_or_error() {
                    return left;
                }
                let index = self.eval_expression(&expr.index);
                if index.is_return_or_error() {
                    return index;
                }
                self.eval_index_expression(left, index)
            }
            Expression::Map(map) => self.eval_map_literal(map),
        }
    }

    /// Evaluate left to right, stopping at the first error or `return`.
    fn eval_expressions(&mut self, exprs: &[Expression]) -> Result<Vec<Rc<Object>>, Rc<Object>> {
        let mut result = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let evaluated = self.eval_expression(expr);
            if evaluated.is_return_or_error() {
                return Err(evaluated);
            }
            result.push(evaluated);
        }
        Ok(result)
    }

    fn eval_identifier_expression(&self, identifier: &IdentifierLiteral) -> Rc<Object> {
        let result = self.env.borrow().get(&identifier.name);

        match result {
            Some(obj) => obj,
            // If we don't find the identifier, look it up as a builtin
            // NOTE: This means that builtins are not "in environment/scope" like other variables
            None => match Builtin::lookup(&identifier.name) {
                Some(builtin) => Rc::new(Object::Builtin(builtin)),
                None => Object::error(RuntimeError::IdentifierNotFound(identifier.name.clone())),
            },
        }
    }

    fn eval_prefix_expression(&self, operator: TokenKind, right: Rc<Object>) -> Rc<Object> {
        match (operator, right.as_ref()) {
            (TokenKind::Bang, obj) => Object::native_bool(!obj.is_truthy()),
            (TokenKind::Minus, Object::Integer(value)) => {
                Rc::new(Object::Integer(value.wrapping_neg()))
            }
            (operator, obj) => Object::error(RuntimeError::UnknownPrefixOperator {
                operator,
                right: obj.typename(),
            }),
        }
    }

    fn eval_infix_expression(
        &self,
        operator: TokenKind,
        left: Rc<Object>,
        right: Rc<Object>,
    ) -> Rc<Object> {
        match (left.as_ref(), right.as_ref()) {
            (Object::Integer(left_value), Object::Integer(right_value)) => {
                self.eval_integer_infix_expression(operator, *left_value, *right_value)
            }
            (Object::String(left_value), Object::String(right_value))
                if operator == TokenKind::Plus =>
            {
                Rc::new(Object::String(format!("{}{}", left_value, right_value)))
            }

            // Everything else compares by identity, which is why the boolean and null sentinels are shared
            _ if operator == TokenKind::EqualEqual => {
                Object::native_bool(Object::is_same(&left, &right))
            }
            _ if operator == TokenKind::BangEqual => {
                Object::native_bool(!Object::is_same(&left, &right))
            }

            (left_obj, right_obj) if left_obj.typename() != right_obj.typename() => {
                Object::error(RuntimeError::TypeMismatch {
                    left: left_obj.typename(),
                    operator,
                    right: right_obj.typename(),
                })
            }
            (left_obj, right_obj) => Object::error(RuntimeError::UnknownInfixOperator {
                left: left_obj.typename(),
                operator,
                right: right_obj.typename(),
            }),
        }
    }

    fn eval_integer_infix_expression(
        &self,
        operator: TokenKind,
        left_value: i64,
        right_value: i64,
    ) -> Rc<Object> {
        match operator {
            TokenKind::Plus => Rc::new(Object::Integer(left_value.wrapping_add(right_value))),
            TokenKind::Minus => Rc::new(Object::Integer(left_value.wrapping_sub(right_value))),
            TokenKind::Star => Rc::new(Object::Integer(left_value.wrapping_mul(right_value))),
            TokenKind::Slash => {
                if right_value == 0 {
                    return Object::error(RuntimeError::DivisionByZero);
                }
                Rc::new(Object::Integer(left_value.wrapping_div(right_value)))
            }

            TokenKind::LessThan => Object::native_bool(left_value < right_value),
            TokenKind::GreaterThan => Object::native_bool(left_value > right_value),
            TokenKind::EqualEqual => Object::native_bool(left_value == right_value),
            TokenKind::BangEqual => Object::native_bool(left_value != right_value),

            operator => Object::error(RuntimeError::UnknownInfixOperator {
                left: ObjectType::Integer,
                operator,
                right: ObjectType::Integer,
            }),
        }
    }

    fn eval_index_expression(&self, left: Rc<Object>, index: Rc<Object>) -> Rc<Object> {
        match (left.as_ref(), index.as_ref()) {
            (Object::Array(arr), Object::Integer(i)) => {
                // Negative or past the end is "absent", not an error
                usize::try_from(*i)
                    .ok()
                    .and_then(|i| arr.elements.get(i))
                    .map_or_else(Object::null, Rc::clone)
            }
            (Object::Map(map), key) => match key.hash_key() {
                Some(hash) => map.get(&hash).unwrap_or_else(Object::null),
                None => Object::error(RuntimeError::UnusableHashKey(key.typename())),
            },
            (left_obj, index_obj) => Object::error(RuntimeError::IndexNotSupported {
                left: left_obj.typename(),
                index: index_obj.typename(),
            }),
        }
    }

    fn eval_map_literal(&mut self, literal: &MapLiteral) -> Rc<Object> {
        let mut map = Map::default();

        for (key_expr, value_expr) in &literal.pairs {
            let key = self.eval_expression(key_expr);
            if key.is_return_or_error() {
                return key;
            }

            let hash = match key.hash_key() {
                Some(hash) => hash,
                None => return Object::error(RuntimeError::UnusableHashKey(key.typename())),
            };

            let value = self.eval_expression(value_expr);
            if value.is_return_or_error() {
                return value;
            }

            // A later key landing in the same slot replaces the earlier pair
            map.insert(hash, key, value);
        }

        Rc::new(Object::Map(map))
    }

    fn eval_if_expression(&mut self, if_expr: &IfExpression) -> Rc<Object> {
        let evaluated_condition = self.eval_expression(&if_expr.condition);
        // Early return the first error received
        if evaluated_condition.is_return_or_error() {
            return evaluated_condition;
        }

        if evaluated_condition.is_truthy() {
            self.eval_block_statement(&if_expr.consequence)
        } else if let Some(alternative) = &if_expr.alternative {
            self.eval_block_statement(alternative)
        } else {
            Object::null()
        }
    }

    fn apply_function(&mut self, func: Rc<Object>, args: Vec<Rc<Object>>) -> Rc<Object> {
        match func.as_ref() {
            Object::Function(function) => {
                // Check that number of args & params matches
                if args.len() != function.parameters.len() {
                    return Object::error(RuntimeError::BadArity {
                        expected: function.parameters.len(),
                        got: args.len(),
                    });
                }

                // The call scope hangs off the defining scope, not the caller's
                let mut scoped_env = Environment::new_enclosed(Rc::clone(&function.env));

                // Add arguments as variables in function's environment
                for (ident, obj) in function.parameters.iter().zip(args) {
                    scoped_env.set(ident.name.clone(), obj);
                }

                tracing::trace!(depth = scoped_env.depth(), "calling function");

                // Remember current environment (when exiting from call)
                let current_env = std::mem::replace(&mut self.env, Rc::new(RefCell::new(scoped_env)));

                // Actually evaluate the function
                let result = self.eval_block_statement(&function.body);

                self.env = current_env;

                match result.as_ref() {
                    Object::ReturnValue(inner_value) => Rc::clone(inner_value),
                    _ => result,
                }
            }
            // Builtins handle themselves
            Object::Builtin(builtin) => match builtin.apply(args) {
                Ok(obj) => obj,
                Err(err) => Object::error(err),
            },
            obj => Object::error(RuntimeError::NotAFunction(obj.typename())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use pretty_assertions::assert_eq;

    use crate::{environment::Environment, evaluator::Evaluator, object::Object};

    use monke_parser::{lexer::Lexer, parser::Parser};

    #[test]
    fn eval_integer_expression() {
        let tests = vec![
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("1 + 2 * 3", 7),
            ("(1 + 2) * 3", 9),
            ("6 / (1 - 3)", -3),
            ("7 / 2", 3),
            ("-7 / 2", -3),
            ("9223372036854775807 + 1", i64::MIN),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_boolean_expression() {
        let tests = vec![
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 < 1", false),
            ("1 > 1", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 2", false),
            ("1 != 2", true),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("true != false", true),
            ("false != true", true),
            ("(1 < 2) == true", true),
            ("(1 < 2) == false", false),
            ("(1 > 2) == true", false),
            ("(1 > 2) == false", true),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_boolean_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_identity_equality() {
        let tests = vec![
            // Both sides are the null sentinel
            ("if (false) { 1 } == if (false) { 2 }", true),
            ("[1] == [1]", false),
            ("let a = [1]; a == a", true),
            ("let a = [1]; a != a", false),
            ("\"a\" == \"a\"", false),
            ("let s = \"a\"; s == s", true),
            ("1 == true", false),
            ("1 != true", true),
            ("let f = fn() { 1 }; f == f", true),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_boolean_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_string_expression() {
        let tests = vec![
            ("\"hello world\"", "hello world"),
            ("\"hello\" + \" \" + \"world\"", "hello world"),
            ("let greet = fn(name) { \"hi \" + name }; greet(\"bob\")", "hi bob"),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_string_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_bang_operator() {
        let tests = vec![
            ("!true", false),
            ("!false", true),
            ("!!true", true),
            ("!!false", false),
            ("!5", false),
            ("!!5", true),
            ("!0", false),
            ("!\"\"", false),
            ("!if (false) { 1 }", true),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_boolean_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_if_else_expression() {
        let tests = vec![
            ("if (true) { 10 }", Some(10)),
            ("if (false) { 10 }", None),
            ("if (1) { 10 }", Some(10)),
            ("if (0) { 10 }", Some(10)),
            ("if (1 < 2) { 10 }", Some(10)),
            ("if (1 > 2) { 10 }", None),
            ("if (1 > 2) { 10 } else { 20 }", Some(20)),
            ("if (1 < 2) { 10 } else { 20 }", Some(10)),
            ("if (1 > 2) { 10 } else if (2 > 1) { 30 } else { 20 }", Some(30)),
            ("if (true) { }", None),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);

            match expected {
                Some(expected_value) => test_integer_object(evaluated, expected_value),
                None => test_null_object(evaluated),
            }
        }
    }

    #[test]
    fn eval_return_statements() {
        let tests = vec![
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            (
                "
                if (10 > 1) {
                  if (10 > 1) {
                    return 10;
                  }

                  return 1;
                }
                ",
                10,
            ),
            (
                "
                let f = fn(x) {
                  if (x > 1) { return x; }
                  0
                };
                f(5) + f(0)
                ",
                5,
            ),
            // A `return` inside an `if` used as a value still leaves the function
            ("let f = fn() { let x = if (true) { return 1; }; 2 }; f()", 1),
            ("let f = fn() { -if (true) { return 2; } }; f()", 2),
            ("let f = fn() { len(if (true) { return 3; }); 0 }; f()", 3),
            ("let f = fn() { {1: if (true) { return 4; }}; 0 }; f()", 4),
            ("let f = fn() { [1][if (true) { return 5; }]; 0 }; f()", 5),
            ("let f = fn() { if (if (true) { return 6; }) { 0 } else { 0 } }; f()", 6),
            ("let f = fn() { [1, if (true) { return 7; }, 3]; 0 }; f()", 7),
            ("let f = fn() { return if (true) { return 9; }; 0 }; f()", 9),
            ("if (true) { return 10; } + 2", 10),
            ("type(if (true) { return 11; })", 11),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value)
        }
    }

    #[test]
    fn eval_let_statements() {
        let tests = vec![
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
            ("let a = 5; let a = a + 1; a", 6),
            ("let len = 3; len", 3),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value)
        }

        test_null_object(evaluate("let a = 5;"));
    }

    #[test]
    fn eval_empty_program() {
        let prog = parse("");
        assert!(Evaluator::new().eval(&prog).is_none());
    }

    #[test]
    fn eval_array_literals() {
        let evaluated = evaluate("[1, 2 * 2, 3 + 3]");

        match evaluated.as_ref() {
            Object::Array(arr) => {
                if arr.elements.len() != 3 {
                    panic!(
                        "expected array object with 3 elements but got {} ({})",
                        arr.elements.len(),
                        arr
                    )
                }

                test_integer_object(Rc::clone(&arr.elements[0]), 1);
                test_integer_object(Rc::clone(&arr.elements[1]), 4);
                test_integer_object(Rc::clone(&arr.elements[2]), 6);
            }
            obj => panic!("expected array object but got {}", obj),
        }
    }

    #[test]
    fn eval_array_index_expression() {
        let tests = vec![
            ("[1, 2, 3][0]", Some(1)),
            ("[1, 2, 3][1]", Some(2)),
            ("[1, 2, 3][2]", Some(3)),
            ("let i = 0; [1][i];", Some(1)),
            ("[1, 2, 3][1 + 1];", Some(3)),
            ("let myArray = [1, 2, 3]; myArray[2];", Some(3)),
            (
                "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
                Some(6),
            ),
            ("let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]", Some(2)),
            ("[1, 2, 3][3]", None),
            ("[1, 2, 3][5]", None),
            ("[1, 2, 3][-1]", None),
            ("[][0]", None),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);
            match expected {
                Some(expected_value) => test_integer_object(evaluated, expected_value),
                None => test_null_object(evaluated),
            }
        }
    }

    #[test]
    fn eval_map_literals() {
        let input = "
            let two = \"two\";
            {
                \"one\": 10 - 9,
                two: 1 + 1,
                \"thr\" + \"ee\": 6 / 2,
                4: 4,
                true: 5,
                false: 6
            }
        ";

        match evaluate(input).as_ref() {
            Object::Map(map) => {
                let expected = vec![
                    (Rc::new(Object::String("one".to_owned())), 1),
                    (Rc::new(Object::String("two".to_owned())), 2),
                    (Rc::new(Object::String("three".to_owned())), 3),
                    (Rc::new(Object::Integer(4)), 4),
                    (Object::native_bool(true), 5),
                    (Object::native_bool(false), 6),
                ];

                assert_eq!(map.pairs.len(), expected.len());
                for (key, expected_value) in expected {
                    let hash = match key.hash_key() {
                        Some(hash) => hash,
                        None => panic!("{} should be hashable", key),
                    };
                    match map.get(&hash) {
                        Some(value) => test_integer_object(value, expected_value),
                        None => panic!("no pair for key {}", key),
                    }
                }
            }
            obj => panic!("expected map object but got {}", obj),
        }
    }

    #[test]
    fn eval_map_index_expression() {
        let tests = vec![
            ("{\"foo\": 5}[\"foo\"]", Some(5)),
            ("{\"foo\": 5}[\"bar\"]", None),
            ("let key = \"foo\"; {\"foo\": 5}[key]", Some(5)),
            ("{}[\"foo\"]", None),
            ("{5: 5}[5]", Some(5)),
            ("{true: 5}[true]", Some(5)),
            ("{false: 5}[false]", Some(5)),
            // Same digest, different type tag
            ("{1: 5}[true]", None),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);
            match expected {
                Some(expected_value) => test_integer_object(evaluated, expected_value),
                None => test_null_object(evaluated),
            }
        }

        test_string_object(evaluate("{1: \"a\", 1: \"b\"}[1]"), "b");
    }

    #[test]
    fn eval_function_expression() {
        let evaluated = evaluate("fn (x) { x + 2; }");

        match evaluated.as_ref() {
            Object::Function(func) => {
                assert_eq!(func.parameters.len(), 1);
                assert_eq!(func.parameters[0].name, "x");
                assert_eq!(func.body.to_string(), "{ (x + 2) }");
                assert_eq!(evaluated.to_string(), "fn(x) { (x + 2) }");
            }
            obj => panic!("expected function object but got {}", obj),
        }
    }

    #[test]
    fn eval_call_expression() {
        let tests = vec![
            ("let identity = fn(x) { x; }; identity(5);", 5),
            ("let identity = fn(x) { return x; }; identity(5);", 5),
            ("let double = fn(x) { x * 2; }; double(5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
            ("fn(x) { x; }(5)", 5),
            (
                "
                let adder = fn(x) { fn(y) { x + y } };
                let fiveAdder = adder(5);
                fiveAdder(3);
                ",
                8,
            ),
            ("let adder = fn(x) { fn(y) { x + y } }; adder(2)(3);", 5),
            (
                "
                let fib = fn(n) { if (n < 2) { return n; } fib(n - 1) + fib(n - 2) };
                fib(15)
                ",
                610,
            ),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_closures_are_lexical() {
        let tests = vec![
            // The call scope hangs off the definition site, not the caller
            ("let x = 10; let f = fn() { x }; let g = fn(x) { f() }; g(99)", 10),
            // The captured scope is shared, so later bindings are visible
            ("let x = 1; let f = fn() { x }; let x = 2; f()", 2),
            // Parameters shadow without touching the outer binding
            ("let x = 1; let f = fn(x) { x * 100 }; f(2) + x", 201),
            // A `let` inside a call stays in that call's scope
            ("let x = 1; let f = fn() { let x = 50; x }; f() + x", 51),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_builtin_functions() {
        let tests = vec![
            ("len(\"\")", Ok(0)),
            ("len(\"four\")", Ok(4)),
            ("len(\"hello world\")", Ok(11)),
            ("len(1)", Err("argument to `len` not supported, got INTEGER")),
            (
                "len(\"one\", \"two\")",
                Err("wrong number of arguments: expected 1, got 2"),
            ),
            ("len([])", Ok(0)),
            ("len([1, \"hello world\", []])", Ok(3)),
            ("first([7, 8])", Ok(7)),
            ("last([7, 8])", Ok(8)),
            ("len(rest([7, 8, 9]))", Ok(2)),
            ("len(push([], 1))", Ok(1)),
            ("first(1)", Err("argument to `first` not supported, got INTEGER")),
            ("let map = fn(arr, f) { if (len(arr) == 0) { [] } else { push(map(rest(arr), f), f(first(arr))) } }; last(map([1, 2, 3], fn(x) { x * 2 }))", Ok(2)),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);

            match expected {
                Ok(expected_value) => test_integer_object(evaluated, expected_value),
                Err(expected_message) => test_error_object(evaluated, expected_message),
            }
        }

        test_string_object(evaluate("type(type)"), "BUILTIN");
        test_string_object(evaluate("type({})"), "MAP");
    }

    #[test]
    fn error_handling() {
        let tests = vec![
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("1 - true; 1;", "type mismatch: INTEGER - BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("-\"a\"", "unknown operator: -STRING"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("\"hello\" - \"world\";", "unknown operator: STRING - STRING"),
            ("\"a\" < \"b\"", "unknown operator: STRING < STRING"),
            ("[1] + 1", "type mismatch: ARRAY + INTEGER"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            ("if (10 > 1) { true + false; }", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "
                if (10 > 1) {
                  if (10 > 1) {
                    return true + false;
                  }
                  return 1;
                }
                ",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            ("let x = foobar; 1", "identifier not found: foobar"),
            ("1 / 0", "division by zero"),
            ("5()", "not a function: INTEGER"),
            ("fn(x) { x }()", "wrong number of arguments: expected 1, got 0"),
            ("fn(x) { x }(1, 2)", "wrong number of arguments: expected 1, got 2"),
            // Only the first failing argument is reported
            ("let f = fn(a, b) { a }; f(missing, 1 + true)", "identifier not found: missing"),
            ("[1, nope, 2 + true]", "identifier not found: nope"),
            ("1[0]", "index operator not supported: INTEGER[INTEGER]"),
            ("[1][\"a\"]", "index operator not supported: ARRAY[STRING]"),
            ("{\"name\": \"monke\"}[fn(x) { x }];", "unusable as hash key: FUNCTION"),
            ("{[1]: 2}", "unusable as hash key: ARRAY"),
            ("{1: missing}", "identifier not found: missing"),
            ("let f = fn() { return 1 + true; 2 }; f(); 3", "type mismatch: INTEGER + BOOLEAN"),
        ];

        for (input, expected_message) in tests {
            let evaluated = evaluate(input);
            test_error_object(evaluated, expected_message)
        }
    }

    #[test]
    fn environment_persists_between_programs() {
        let env = Rc::new(RefCell::new(Environment::new()));

        let first = Evaluator::new_with_env(Rc::clone(&env)).eval(&parse("let x = 40;"));
        assert!(first.is_some());

        match Evaluator::new_with_env(env).eval(&parse("x + 2")) {
            Some(obj) => test_integer_object(obj, 42),
            None => panic!("expected a result"),
        }
    }

    fn parse(input: &str) -> monke_parser::ast::Program {
        let l = Lexer::new(input);
        let mut p = Parser::new(l);

        match p.parse_program() {
            Ok(prog) => prog,
            Err(errors) => {
                println!("parser had {} errors", errors.len());
                for error in errors {
                    println!("parser error: {}", error);
                }
                panic!("parser errors")
            }
        }
    }

    fn evaluate(input: &str) -> Rc<Object> {
        match Evaluator::new().eval(&parse(input)) {
            Some(obj) => obj,
            None => panic!("expected a result for '{}'", input),
        }
    }

    fn test_integer_object(obj: Rc<Object>, expected_value: i64) {
        match *obj {
            Object::Integer(value) => {
                if value != expected_value {
                    panic!(
                        "expected integer object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
            }
            _ => panic!("expected integer object but got {:?}", obj),
        }
    }

    fn test_boolean_object(obj: Rc<Object>, expected_value: bool) {
        match *obj {
            Object::Boolean(value) => {
                if value != expected_value {
                    panic!(
                        "expected boolean object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
                // Booleans must always be the shared sentinels
                assert!(Object::is_same(&obj, &Object::native_bool(value)));
            }
            _ => panic!("expected boolean object but got {:?}", obj),
        }
    }

    fn test_string_object(obj: Rc<Object>, expected_value: &str) {
        match obj.as_ref() {
            Object::String(value) => {
                if value != expected_value {
                    panic!(
                        "expected string object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
            }
            _ => panic!("expected string object but got {:?}", obj),
        }
    }

    fn test_null_object(obj: Rc<Object>) {
        match *obj {
            Object::Null => assert!(Object::is_same(&obj, &Object::null())),
            _ => panic!("expected null object but got {:?}", obj),
        }
    }

    fn test_error_object(obj: Rc<Object>, expected_message: &str) {
        match obj.as_ref() {
            Object::Error(err) => assert_eq!(err.to_string(), expected_message),
            _ => panic!("expected error object but got {:?}", obj),
        }
    }
}
