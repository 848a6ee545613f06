use sql_marshal::config::{MarshalOptions, set_validate_sql, validate_sql_enabled};
use sql_marshal::prelude::*;
use sql_marshal::template::{
    TemplateCache, validate_arrays, validate_batch, validate_params, validate_sql,
    validate_statements,
};

// The switch is process-wide, so every check lives in one test.
#[test]
fn switch_gates_every_validator() {
    let sql = "insert into t (a, b) values (?, ?)";
    let one: ParamSet = vec![SqlValue::Int(1)].into();
    let two: ParamSet = vec![SqlValue::Int(1), SqlValue::Int(2)].into();

    assert!(validate_sql_enabled());
    validate_params(sql, Some(&two)).unwrap();
    assert!(validate_params(sql, Some(&one)).is_err());
    assert!(validate_params(sql, None).is_err());

    let err = validate_batch(sql, &[two.clone(), one.clone()]).unwrap_err();
    assert!(matches!(
        err,
        SqlMarshalError::ParameterCountMismatch {
            holder_size: 2,
            expected: 1,
            ..
        }
    ));
    assert!(validate_arrays(sql, &[vec![SqlValue::Null]]).is_err());
    assert!(validate_statements(&["delete from t", "delete from t where a = ?"]).is_err());
    assert!(validate_sql("select 'unterminated", 0).is_err());

    MarshalOptions::builder()
        .validate_sql(false)
        .template_cache_capacity(8)
        .install()
        .unwrap();
    assert!(!validate_sql_enabled());
    assert_eq!(TemplateCache::global().capacity().get(), 8);

    validate_params(sql, Some(&one)).unwrap();
    validate_batch(sql, &[two.clone(), one.clone()]).unwrap();
    validate_arrays(sql, &[vec![SqlValue::Null]]).unwrap();
    validate_statements(&["delete from t where a = ?"]).unwrap();
    validate_sql("select 'unterminated", 0).unwrap();

    // The ungated check ignores the switch.
    assert!(validate_placeholder_count(sql, 1).is_err());

    set_validate_sql(true);
    assert!(validate_params(sql, Some(&one)).is_err());

    assert!(
        MarshalOptions::default()
            .with_template_cache_capacity(0)
            .install()
            .is_err()
    );
}
