use std::rc::Rc;

use pretty_assertions::assert_eq;
use tally_eval::BinaryOperator;
use tally_ir::CalcError;
use tally_parse::{ExprNode, SymbolTransition};

use super::*;

#[test]
fn test_compile_and_execute_binds_answer() {
    let mut calc = Calculator::integer().unwrap();
    assert_eq!(calc.compile_and_execute(Notation::Infix, "6 * 7").unwrap(), Some(42));
    assert_eq!(calc.compile_and_execute(Notation::Postfix, "$ans 2 /").unwrap(), Some(21));
    assert_eq!(calc.last_answer().unwrap(), 21);
}

#[test]
fn test_empty_result_binds_null() {
    let mut calc = Calculator::integer().unwrap();
    calc.compile_and_execute(Notation::Infix, "5").unwrap();
    assert_eq!(calc.compile_and_execute(Notation::Postfix, "").unwrap(), None);
    assert_eq!(calc.last_answer().unwrap(), 0);
}

#[test]
fn test_last_answer_before_any_evaluation() {
    let calc = Calculator::integer().unwrap();
    assert_eq!(calc.last_answer().unwrap(), 0);
}

#[test]
fn test_global_stack_keeps_extra_values() {
    let mut calc = Calculator::integer().unwrap();
    assert_eq!(calc.compile_and_execute(Notation::Postfix, "1 2 3").unwrap(), Some(3));
    assert_eq!(calc.global_stack().as_slice(), &[1, 2]);
    assert_eq!(calc.compile_and_execute(Notation::Postfix, "+").unwrap(), Some(3));
    calc.compile_and_execute(Notation::Postfix, "4").unwrap();
    calc.clear_global_stack();
    assert!(calc.global_stack().is_empty());
}

#[test]
fn test_set_global_symbol() {
    let mut calc = Calculator::integer().unwrap();
    calc.set_global_symbol("answer", Symbol::Value(42));
    assert_eq!(calc.compile_and_execute(Notation::Infix, "answer + 1").unwrap(), Some(43));
    calc.set_global_symbol("answer", Symbol::getter(|| Ok(7)));
    assert_eq!(calc.compile_and_execute(Notation::Prefix, "(+ answer 1)").unwrap(), Some(8));
}

#[test]
fn test_execute_against_own_frame() {
    let calc = Calculator::integer().unwrap();
    let program = calc.compile(Notation::Infix, "2 + 3").unwrap();
    let mut frame = calc.environment().top_frame().child();
    calc.execute(&program, &mut frame).unwrap();
    assert_eq!(frame.stack().as_slice(), &[5]);
    assert!(calc.global_stack().is_empty());
}

#[test]
fn test_failed_execution_surfaces_error() {
    let mut calc = Calculator::integer().unwrap();
    let err = calc.compile_and_execute(Notation::Infix, "nope + 1").unwrap_err();
    assert_eq!(err, CalcError::UnknownSymbol("nope".to_string()));
}

#[test]
fn test_typed_calculator() {
    let mut calc = Calculator::typed().unwrap();
    let answer = calc.compile_and_execute(Notation::Infix, "2 * (1 + 0.5)").unwrap().unwrap();
    assert_eq!(answer.to_string(), "3.0");
    assert_eq!(calc.compile_and_execute(Notation::Postfix, "").unwrap(), None);
    assert_eq!(calc.last_answer().unwrap().type_name(), "<null>");
}

/// `inc(x)` parses as `x + 1`.
struct Increment(Rc<BinaryOperator<i64>>);

impl SymbolTransition<i64> for Increment {
    fn create_node(
        &self,
        _env: &Environment<i64>,
        symbol: &str,
        mut children: Vec<ExprNode<i64>>,
    ) -> CalcResult<ExprNode<i64>> {
        let operand = children
            .pop()
            .ok_or_else(|| CalcError::Setup(format!("'{symbol}' needs an operand")))?;
        Ok(ExprNode::Binary {
            op: Rc::clone(&self.0),
            left: Box::new(operand),
            right: Box::new(ExprNode::Value(1)),
        })
    }
}

#[test]
fn test_dialect_extension_after_construction() {
    let mut calc = Calculator::integer().unwrap();
    let plus = Rc::clone(calc.compilers_mut().operators().binary("+").unwrap());
    calc.compilers_mut()
        .add_symbol_transition(Notation::Infix, "inc", Rc::new(Increment(plus)))
        .unwrap();
    let program = calc.compile(Notation::Infix, "inc(41)").unwrap();
    assert_eq!(program.to_string(), "41 1 +");
    assert_eq!(calc.execute_and_pop(&program).unwrap(), Some(42));
}
