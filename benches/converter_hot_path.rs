//! Criterion measurements of the per-call marshaling cost: template lookup, converter
//! bind and read over in-memory handles, and a single-row SQLite select through the
//! converter compared with hand-written rusqlite row mapping.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rusqlite::Connection;
use sql_marshal::prelude::*;

sql_marshal::data_object! {
    #[derive(Debug, Clone)]
    pub struct Order {
        pub id: i64,
        pub customer: String,
        pub quantity: i32,
        pub total: f64,
        pub note: Option<String>,
    }
}

sql_marshal::data_object! {
    pub struct ById {
        pub id: i64,
    }
}

const SELECT: &str = "SELECT id, customer, quantity, total, note FROM orders WHERE id = #{id}";

fn sample() -> Order {
    Order {
        id: 42,
        customer: "acme".into(),
        quantity: 3,
        total: 99.5,
        note: None,
    }
}

fn seeded_connection(rows: i64) -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer VARCHAR(40), \
         quantity INTEGER, total DOUBLE, note VARCHAR(40));",
    )?;
    let mut stmt = conn.prepare("INSERT INTO orders VALUES (?1, ?2, ?3, ?4, NULL)")?;
    for id in 1..=rows {
        stmt.execute(rusqlite::params![id, format!("customer-{id}"), id % 7, id as f64 * 1.5])?;
    }
    drop(stmt);
    Ok(conn)
}

fn bench_in_memory(c: &mut Criterion) {
    let converter = get_converter::<Order>().unwrap();
    let order = sample();
    let parsed = rewrite_template(
        "INSERT INTO orders VALUES (#{id}, #{customer}, #{quantity}, #{total}, #{note})",
    );

    let mut group = c.benchmark_group("in_memory");
    group.bench_function("rewrite_template_hit", |b| {
        b.iter(|| black_box(rewrite_template(black_box(SELECT))));
    });
    group.bench_function("get_converter_hit", |b| {
        b.iter(|| black_box(get_converter::<Order>().unwrap()));
    });
    group.bench_function("bind", |b| {
        b.iter(|| {
            let mut buf = ParamBuffer::new();
            converter
                .bind(&mut buf, black_box(&order), parsed.parameter_names())
                .unwrap();
            black_box(buf)
        });
    });

    let mut buf = ParamBuffer::new();
    converter.bind(&mut buf, &order, parsed.parameter_names()).unwrap();
    let mut rs = ResultSet::new(
        parsed.parameter_names().to_vec(),
        vec![
            SqlType::BigInt,
            SqlType::Varchar,
            SqlType::Integer,
            SqlType::Double,
            SqlType::Varchar,
        ],
    );
    rs.add_row_values(buf.into_values());
    let codes = converter.map_column_codes(rs.get_column_names().as_slice());
    group.bench_function("read", |b| {
        b.iter(|| black_box(converter.read(&rs.rows()[0], &codes).unwrap()));
    });
    group.finish();
}

fn bench_sqlite_lookup(c: &mut Criterion) {
    let conn = seeded_connection(1_000).unwrap();
    let mut group = c.benchmark_group("sqlite_single_row");

    group.bench_function("raw_rusqlite", |b| {
        let mut id = 0_i64;
        b.iter(|| {
            id = id % 1_000 + 1;
            let mut stmt = conn
                .prepare_cached("SELECT id, customer, quantity, total, note FROM orders WHERE id = ?1")
                .unwrap();
            let order = stmt
                .query_row([id], |row| {
                    Ok(Order {
                        id: row.get(0)?,
                        customer: row.get(1)?,
                        quantity: row.get(2)?,
                        total: row.get(3)?,
                        note: row.get(4)?,
                    })
                })
                .unwrap();
            black_box(order)
        });
    });

    group.bench_function("select_objects", |b| {
        let mut id = 0_i64;
        b.iter(|| {
            id = id % 1_000 + 1;
            let rows: Vec<Order> = select_objects(&conn, SELECT, &ById { id }).unwrap();
            black_box(rows)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_in_memory, bench_sqlite_lookup);
criterion_main!(benches);
