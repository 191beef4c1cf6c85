use pretty_assertions::assert_eq;

use rowbind::helper::{MySqlHelper, PostgresHelper, SqlServerHelper, SqliteHelper};
use rowbind::{DbHelper, SchemaObjectKind, Value, ValueKind};

fn v(s: &str) -> Value {
    Value::from(s)
}

#[test]
fn sqlite_identity_is_the_sole_integer_primary_key() {
    let rows = vec![
        vec![Value::I64(0), v("Id"), v("INTEGER"), Value::I64(1), Value::Null, Value::I64(1)],
        vec![Value::I64(1), v("Name"), v("TEXT"), Value::I64(0), Value::Null, Value::I64(0)],
    ];
    let fields = SqliteHelper.parse_fields("Person", rows).unwrap();

    let id = fields.get_by_name("Id").unwrap();
    assert!(id.is_primary && id.is_identity && !id.is_nullable);
    assert_eq!(id.kind, ValueKind::I32);

    let name = fields.get_by_name("Name").unwrap();
    assert!(!name.is_primary && name.is_nullable);
}

#[test]
fn sqlite_composite_key_has_no_identity() {
    let rows = vec![
        vec![Value::I64(0), v("A"), v("INTEGER"), Value::I64(1), Value::Null, Value::I64(1)],
        vec![Value::I64(1), v("B"), v("INTEGER"), Value::I64(1), Value::Null, Value::I64(2)],
    ];
    let fields = SqliteHelper.parse_fields("Pair", rows).unwrap();
    assert!(fields.iter().all(|f| !f.is_identity));
    assert!(fields.get_primary().is_none(), "two primary columns");
}

#[test]
fn sqlite_missing_table_fails() {
    assert!(SqliteHelper
        .parse_fields("Nope", vec![])
        .unwrap_err()
        .is_missing_mapping());
}

fn mysql_column(name: &str, key: &str, nullable: &str, ty: &str, extra: &str, default: Value) -> Vec<Value> {
    vec![
        v(name),
        v(key),
        v(nullable),
        v(ty),
        Value::Null,
        Value::Null,
        Value::Null,
        v(extra),
        default,
    ]
}

#[test]
fn mysql_separates_defaults_from_auto_updates() {
    let rows = vec![
        mysql_column("Id", "PRI", "NO", "bigint", "auto_increment", Value::Null),
        mysql_column("Name", "", "YES", "varchar", "", Value::Null),
        mysql_column("CreatedAt", "", "NO", "timestamp", "DEFAULT_GENERATED", v("CURRENT_TIMESTAMP")),
        mysql_column(
            "UpdatedAt",
            "",
            "NO",
            "timestamp",
            "DEFAULT_GENERATED on update CURRENT_TIMESTAMP",
            v("CURRENT_TIMESTAMP"),
        ),
        mysql_column("FullName", "", "YES", "varchar", "STORED GENERATED", Value::Null),
    ];
    let fields = MySqlHelper.parse_fields("Person", rows).unwrap();

    let id = fields.get_by_name("Id").unwrap();
    assert!(id.is_identity && id.is_primary);
    assert_eq!(id.kind, ValueKind::I64);

    // A static default stays writable on insert.
    let created = fields.get_by_name("CreatedAt").unwrap();
    assert!(created.has_default && !created.is_generated());

    // An on-update rewrite is generated and excluded from writes.
    let updated = fields.get_by_name("UpdatedAt").unwrap();
    assert!(updated.is_auto_updated && updated.is_generated() && !updated.is_computed);

    let full = fields.get_by_name("FullName").unwrap();
    assert!(full.is_computed && full.is_generated());
}

#[test]
fn postgres_identity_and_serial_detection() {
    let row = |name: &str, identity: &str, default: Value, generated: &str| {
        vec![
            v(name),
            Value::Bool(name == "Id"),
            v("YES"),
            v("bigint"),
            Value::Null,
            Value::Null,
            Value::Null,
            v(identity),
            default,
            v(generated),
        ]
    };
    let rows = vec![
        row("Id", "NO", v("nextval('person_id_seq'::regclass)"), "NEVER"),
        row("Code", "YES", Value::Null, "NEVER"),
        row("Total", "NO", Value::Null, "ALWAYS"),
        row("Note", "NO", v("''::text"), "NEVER"),
    ];
    let fields = PostgresHelper.parse_fields("Person", rows).unwrap();

    assert!(fields.get_by_name("Id").unwrap().is_identity, "serial default");
    assert!(fields.get_by_name("Code").unwrap().is_identity, "declared identity");
    assert!(fields.get_by_name("Total").unwrap().is_computed);
    let note = fields.get_by_name("Note").unwrap();
    assert!(note.has_default && !note.is_identity);
}

#[test]
fn sql_server_catalog_flags() {
    let row = |name: &str, identity: bool, nullable: bool, computed: bool, primary: bool| {
        vec![
            v(name),
            Value::Bool(identity),
            Value::Bool(nullable),
            Value::Bool(computed),
            v("bigint"),
            Value::I64(8),
            Value::I64(19),
            Value::I64(0),
            Value::Bool(primary),
            Value::Bool(false),
        ]
    };
    let rows = vec![
        row("Id", true, false, false, true),
        row("Total", false, true, true, false),
    ];
    let fields = SqlServerHelper.parse_fields("Person", rows).unwrap();

    let id = fields.get_by_name("Id").unwrap();
    assert!(id.is_primary && id.is_identity);
    assert_eq!(id.precision, Some(19));
    assert!(fields.get_by_name("Total").unwrap().is_computed);
}

#[test]
fn schema_objects_map_known_kinds_and_reject_others() {
    let rows = vec![
        vec![v("U "), v("dbo"), v("Person")],
        vec![v("V "), v("dbo"), v("ActivePeople")],
    ];
    let objects = SqlServerHelper.parse_objects(rows).unwrap();
    assert_eq!(objects[0].kind, SchemaObjectKind::Table);
    assert_eq!(objects[1].kind, SchemaObjectKind::View);
    assert_eq!(objects[1].name, "ActivePeople");

    let err = SqlServerHelper
        .parse_objects(vec![vec![v("SO"), v("dbo"), v("PersonSeq")]])
        .unwrap_err();
    assert!(err.is_unrecognized_schema_object());
}

#[test]
fn version_round_trip() {
    let setting = MySqlHelper
        .parse_version(Some(v("10.11.6-MariaDB-1:10.11.6+maria~deb12")))
        .unwrap();
    assert!(setting.is_maria_db);
    assert_eq!((setting.major, setting.minor, setting.patch), (10, 11, 6));

    let setting = SqliteHelper.parse_version(Some(v("3.45.1"))).unwrap();
    assert!(setting.at_least(3, 35));

    assert!(PostgresHelper
        .parse_version(None)
        .unwrap_err()
        .is_configuration());
}
