use super::*;
use pretty_assertions::assert_eq;

use crate::instruction::{Instruction, Program, SymbolCall};

fn env() -> Environment<i64> {
    let env = Environment::new(0);
    install_generic_functions(&env);
    env.set_global_symbol(
        "sum",
        accumulator("sum", 0, |a: i64, b: i64| Ok(a + b), |v, _| Ok(v)),
    );
    env.set_global_symbol(
        "avg",
        accumulator("avg", 0, |a: i64, b: i64| Ok(a + b), |v, n| {
            Ok(v / i64::try_from(n).unwrap_or(1))
        }),
    );
    env
}

/// Push `values`, then call `call`.
fn run(values: &[i64], call: &str) -> CalcResult<Vec<i64>> {
    let mut env = env();
    let mut program: Program<i64> = values.iter().copied().map(Instruction::Value).collect();
    program.push(Instruction::SymbolCall(SymbolCall::parse(call)?));
    env.execute(&program)?;
    Ok(env.top_frame().stack().as_slice().to_vec())
}

#[test]
fn test_swap() {
    assert_eq!(run(&[1, 2, 3], "swap").unwrap(), vec![1, 3, 2]);
    assert!(matches!(
        run(&[1, 2], "swap@3"),
        Err(CalcError::StackValidation(_))
    ));
    assert!(matches!(
        run(&[1], "swap"),
        Err(CalcError::StackValidation(_))
    ));
}

#[test]
fn test_pop() {
    assert_eq!(run(&[1, 2, 3], "pop").unwrap(), vec![1, 2]);
    assert_eq!(run(&[1, 2, 3], "pop@2").unwrap(), vec![1]);
    assert!(matches!(
        run(&[1, 2], "pop@1,1"),
        Err(CalcError::StackValidation(_))
    ));
    assert!(matches!(
        run(&[], "pop"),
        Err(CalcError::StackUnderflow(_))
    ));
}

#[test]
fn test_dup() {
    assert_eq!(run(&[2], "dup").unwrap(), vec![2, 2]);
    assert_eq!(run(&[1, 2, 3], "dup@2").unwrap(), vec![1, 2, 3, 2, 3]);
    assert_eq!(run(&[1, 2], "dup@2,3").unwrap(), vec![1, 2, 1]);
    assert_eq!(run(&[7], "dup@,3").unwrap(), vec![7, 7, 7]);
    assert_eq!(run(&[7], "dup@1,0").unwrap(), Vec::<i64>::new());
}

#[test]
fn test_fail() {
    assert_eq!(run(&[], "fail"), Err(CalcError::Execution(None)));
    assert_eq!(
        run(&[42], "fail@1"),
        Err(CalcError::Execution(Some("42".to_string())))
    );
    assert!(matches!(
        run(&[1, 2], "fail@2"),
        Err(CalcError::StackValidation(_))
    ));
}

#[test]
fn test_accumulator_defaults_to_two() {
    assert_eq!(run(&[1, 2, 3], "sum").unwrap(), vec![1, 5]);
    assert_eq!(run(&[1, 2, 3], "sum@3").unwrap(), vec![6]);
    assert_eq!(run(&[1, 2, 3], "sum@1").unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_accumulator_zero_args_pushes_null() {
    assert_eq!(run(&[5], "sum@0").unwrap(), vec![5, 0]);
}

#[test]
fn test_accumulator_finish_sees_count() {
    assert_eq!(run(&[2, 4, 6], "avg@3").unwrap(), vec![4]);
}

#[test]
fn test_accumulator_single_result() {
    assert!(matches!(
        run(&[1, 2], "sum@2,2"),
        Err(CalcError::StackValidation(_))
    ));
}
