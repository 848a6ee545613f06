#![cfg(feature = "sqlite")]
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use sql_marshal::prelude::*;
use sql_marshal::sqlite::{
    execute_batch_objects, execute_batch_values, execute_statements, execute_values, select_rows,
};

const SCHEMA: &str = "CREATE TABLE everything (
    id INTEGER PRIMARY KEY,
    tiny TINYINT,
    small SMALLINT,
    big BIGINT,
    ratio FLOAT,
    weight DOUBLE,
    price DECIMAL(10,2),
    name VARCHAR(40),
    grade CHAR(1),
    active BOOLEAN,
    born DATE,
    alarm TIME,
    seen TIMESTAMP,
    stamped TIMESTAMP,
    raw VARBINARY,
    image BLOB,
    essay CLOB,
    extra JSON,
    nickname VARCHAR(20)
)";

const INSERT: &str = "INSERT INTO everything (id, tiny, small, big, ratio, weight, price, name, \
    grade, active, born, alarm, seen, stamped, raw, image, essay, extra, nickname) VALUES \
    (#{id}, #{tiny}, #{small}, #{big}, #{ratio}, #{weight}, #{price}, #{name}, #{grade}, \
    #{active}, #{born}, #{alarm}, #{seen}, #{stamped}, #{raw}, #{image}, #{essay}, #{extra}, \
    #{nickname})";

sql_marshal::data_object! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Everything {
        pub id: i64,
        pub tiny: i8,
        pub small: i16,
        pub big: i64,
        pub ratio: f32,
        pub weight: f64,
        pub price: Decimal,
        pub name: String,
        pub grade: char,
        pub active: bool,
        pub born: NaiveDate,
        pub alarm: NaiveTime,
        pub seen: NaiveDateTime,
        pub stamped: chrono::DateTime<Utc>,
        pub raw: Vec<u8>,
        pub image: Blob,
        pub essay: Clob,
        pub extra: serde_json::Value,
        pub nickname: Option<String>,
    }
}

sql_marshal::data_object! {
    #[derive(Debug)]
    pub struct ById {
        pub id: i64,
    }
}

sql_marshal::data_object! {
    #[derive(Debug, PartialEq)]
    pub struct Renamed {
        pub id: i64,
        pub nickname: Option<String>,
    }
}

fn sample(id: i64, nickname: Option<&str>) -> Everything {
    let born = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
    let seen = born.and_hms_milli_opt(12, 0, 1, 250).unwrap();
    Everything {
        id,
        tiny: -3,
        small: 300,
        big: 1 << 40,
        ratio: 1.5,
        weight: 72.25,
        price: Decimal::new(1234, 2),
        name: format!("user-{id}"),
        grade: 'A',
        active: true,
        born,
        alarm: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
        seen,
        stamped: Utc.from_utc_datetime(&seen),
        raw: vec![0, 1, 2, 255],
        image: Blob(vec![9, 8, 7]),
        essay: Clob("a long piece of text".into()),
        extra: json!({"tags": ["a", "b"], "n": 3}),
        nickname: nickname.map(str::to_string),
    }
}

fn open() -> Result<Connection, Box<dyn std::error::Error>> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

#[test]
fn every_category_round_trips_through_sqlite() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open()?;
    let with_nick = sample(1, Some("ace"));
    let without_nick = sample(2, None);

    assert_eq!(execute_object(&conn, INSERT, &with_nick)?, 1);
    assert_eq!(execute_object(&conn, INSERT, &without_nick)?, 1);

    let found: Vec<Everything> =
        select_objects(&conn, "SELECT * FROM everything WHERE id = #{id}", &ById { id: 1 })?;
    assert_eq!(found, vec![with_nick]);

    let found: Vec<Everything> =
        select_objects(&conn, "SELECT * FROM everything WHERE id = #{id}", &ById { id: 2 })?;
    assert_eq!(found, vec![without_nick]);
    Ok(())
}

#[test]
fn aliased_labels_pick_the_member() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open()?;
    execute_object(&conn, INSERT, &sample(5, None))?;

    let rows: Vec<Renamed> = select_objects(
        &conn,
        "SELECT name AS nickname, id, price AS unrelated FROM everything WHERE id = #{id}",
        &ById { id: 5 },
    )?;
    assert_eq!(
        rows,
        vec![Renamed {
            id: 5,
            nickname: Some("user-5".into()),
        }]
    );
    Ok(())
}

#[test]
fn unknown_template_names_bind_null() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open()?;
    execute_object(&conn, INSERT, &sample(3, Some("gone")))?;

    let changed = execute_object(
        &conn,
        "UPDATE everything SET nickname = #{not_a_member} WHERE id = #{id}",
        &ById { id: 3 },
    )?;
    assert_eq!(changed, 1);

    let rows: Vec<Renamed> = select_objects(
        &conn,
        "SELECT id, nickname FROM everything WHERE id = #{id}",
        &ById { id: 3 },
    )?;
    assert_eq!(rows[0].nickname, None);
    Ok(())
}

#[test]
fn batches_and_raw_arrays() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let conn = Connection::open(dir.path().join("batch.db"))?;
    conn.execute_batch(SCHEMA)?;

    let batch: Vec<Everything> = (10..13).map(|id| sample(id, None)).collect();
    assert_eq!(execute_batch_objects(&conn, INSERT, &batch)?, 3);

    let mut renames = Vec::new();
    for id in [10_i64, 12] {
        let mut ps = ParamSet::new();
        ps.push(format!("nick-{id}")).push(id);
        renames.push(ps);
    }
    let changed =
        execute_batch_values(&conn, "UPDATE everything SET nickname = ? WHERE id = ?", &renames)?;
    assert_eq!(changed, 2);

    let mut ps = ParamSet::new();
    ps.push_typed(11_i32, SqlType::BigInt);
    let rows: Vec<Renamed> =
        select_rows(&conn, "SELECT id, nickname FROM everything WHERE id >= ? ORDER BY id", &ps)?;
    assert_eq!(
        rows,
        vec![
            Renamed {
                id: 11,
                nickname: None
            },
            Renamed {
                id: 12,
                nickname: Some("nick-12".into())
            },
        ]
    );

    let all = select_values(
        &conn,
        "SELECT id, born, price FROM everything ORDER BY id",
        &ParamSet::new(),
    )?;
    assert_eq!(all.len(), 3);
    let first = &all.rows()[0];
    assert_eq!(first.get("id"), Some(&SqlValue::Int(10)));
    assert_eq!(
        first.get("born"),
        Some(&SqlValue::Date(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap()))
    );
    assert_eq!(first.get("price"), Some(&SqlValue::Decimal(Decimal::new(1234, 2))));

    let mut ps = ParamSet::new();
    ps.push(10_i64);
    assert_eq!(
        execute_values(&conn, "DELETE FROM everything WHERE id = ?", &ps)?,
        1
    );
    assert_eq!(
        execute_statements(
            &conn,
            &[
                "DELETE FROM everything WHERE id = 11",
                "DELETE FROM everything WHERE id = 12",
            ]
        )?,
        2
    );
    Ok(())
}

#[test]
fn validation_rejects_mismatched_templates() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open()?;

    let err = execute_object(
        &conn,
        "UPDATE everything SET name = ? WHERE id = #{id}",
        &ById { id: 1 },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SqlMarshalError::ParameterCountMismatch {
            holder_size: 2,
            expected: 1,
            ..
        }
    ));

    let mut ps = ParamSet::new();
    ps.push(1_i64);
    let err = select_values(&conn, "SELECT * FROM everything", &ps).unwrap_err();
    assert!(matches!(
        err,
        SqlMarshalError::ParameterCountMismatch {
            holder_size: 0,
            expected: 1,
            ..
        }
    ));

    let err = execute_statements(&conn, &["DELETE FROM everything WHERE id = ?"]).unwrap_err();
    assert!(matches!(err, SqlMarshalError::ParameterCountMismatch { .. }));
    Ok(())
}

#[test]
fn null_into_required_member_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open()?;
    conn.execute("INSERT INTO everything (id) VALUES (99)", [])?;

    let err = select_objects::<Everything, _>(
        &conn,
        "SELECT * FROM everything WHERE id = #{id}",
        &ById { id: 99 },
    )
    .unwrap_err();
    match err {
        SqlMarshalError::Coercion { member, source } => {
            assert_eq!(member, "tiny");
            assert_eq!(source, CoercionError::UnexpectedNull(ValueKind::TinyInt));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn decimals_keep_their_value_or_are_refused() -> Result<(), Box<dyn std::error::Error>> {
    use std::str::FromStr;

    let conn = open()?;
    let mut wide_integral = sample(20, None);
    wide_integral.price = Decimal::from_str("12345678901234567")?;
    execute_object(&conn, INSERT, &wide_integral)?;
    let found: Vec<Everything> =
        select_objects(&conn, "SELECT * FROM everything WHERE id = #{id}", &ById { id: 20 })?;
    assert_eq!(found[0].price, wide_integral.price);

    let mut wide_fraction = sample(21, None);
    wide_fraction.price = Decimal::from_str("12345678901234567.89")?;
    let err = execute_object(&conn, INSERT, &wide_fraction).unwrap_err();
    assert!(matches!(err, SqlMarshalError::Parameter(_)));

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM everything WHERE id = 21", [], |r| {
        r.get(0)
    })?;
    assert_eq!(count, 0);
    Ok(())
}
