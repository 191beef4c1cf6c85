use pretty_assertions::assert_eq;

use rowbind_core::{
    DbField, DbFieldCollection, Field, Provider, QueryField, QueryGroup, Value, ValueKind,
};
use rowbind_sql::{Builder, ParamMap};

fn id_field(provider: Provider) -> DbField {
    DbField {
        is_primary: true,
        is_identity: true,
        is_nullable: false,
        ..DbField::new("Id", ValueKind::I64, provider)
    }
}

fn person_fields(provider: Provider) -> Vec<DbField> {
    vec![
        DbField::new("Name", ValueKind::String, provider),
        DbField::new("Age", ValueKind::I32, provider),
    ]
}

fn select_fields() -> Vec<Field> {
    vec![Field::from("Id"), Field::from("Name"), Field::from("Age")]
}

#[test]
fn select_sql_server_top_and_hints() {
    let group = QueryGroup::parse([("Id", 5i64)]);
    let mut params = ParamMap::new();

    let sql = Builder::sql_server()
        .select(
            "Person",
            &select_fields(),
            Some(&group),
            None,
            Some(10),
            Some("WITH (NOLOCK)"),
            &mut params,
        )
        .unwrap();

    assert_eq!(
        sql,
        "SELECT TOP (10) [Id], [Name], [Age] FROM [Person] WITH (NOLOCK) WHERE ([Id] = @Id) ;"
    );
    assert_eq!(params.get("Id"), Some(&Value::I64(5)));
}

#[test]
fn select_postgresql_limit() {
    let mut params = ParamMap::new();
    let sql = Builder::postgresql()
        .select("Person", &select_fields(), None, None, Some(5), None, &mut params)
        .unwrap();

    assert_eq!(sql, "SELECT \"Id\", \"Name\", \"Age\" FROM \"Person\" LIMIT 5 ;");
    assert!(params.is_empty());
}

#[test]
fn select_oracle_fetch_first() {
    let mut params = ParamMap::new();
    let sql = Builder::oracle()
        .select("Person", &select_fields(), None, None, Some(3), None, &mut params)
        .unwrap();

    assert_eq!(
        sql,
        "SELECT \"Id\", \"Name\", \"Age\" FROM \"Person\" FETCH FIRST 3 ROWS ONLY ;"
    );
}

#[test]
fn select_hints_rejected_without_support() {
    let mut params = ParamMap::new();
    let err = Builder::postgresql()
        .select(
            "Person",
            &select_fields(),
            None,
            None,
            None,
            Some("WITH (NOLOCK)"),
            &mut params,
        )
        .unwrap_err();

    assert!(err.is_not_supported());
}

#[test]
fn select_requires_fields() {
    let mut params = ParamMap::new();
    let err = Builder::sqlite()
        .select("Person", &[], None, None, None, None, &mut params)
        .unwrap_err();

    assert!(err.is_missing_mapping());
}

#[test]
fn select_prunes_skippable_null_guard_on_non_nullable_column() {
    let provider = Provider::SqlServer;
    let db_fields: DbFieldCollection = [DbField {
        is_nullable: false,
        ..DbField::new("Name", ValueKind::String, provider)
    }]
    .into_iter()
    .collect();

    let group = QueryGroup::and([
        QueryField::equal("Name", "Ann"),
        QueryField::is_not_null("Name").with_can_skip(),
    ]);

    let mut params = ParamMap::new();
    let sql = Builder::sql_server()
        .select(
            "Person",
            &[Field::from("Name")],
            Some(&group),
            Some(&db_fields),
            None,
            None,
            &mut params,
        )
        .unwrap();

    assert_eq!(sql, "SELECT [Name] FROM [Person] WHERE ([Name] = @Name) ;");
}

#[test]
fn select_keeps_skippable_guard_on_nullable_column() {
    let provider = Provider::SqlServer;
    let db_fields: DbFieldCollection =
        [DbField::new("Name", ValueKind::String, provider)].into_iter().collect();

    let group = QueryGroup::and([
        QueryField::equal("Name", "Ann"),
        QueryField::is_not_null("Name").with_can_skip(),
    ]);

    let mut params = ParamMap::new();
    let sql = Builder::sql_server()
        .select(
            "Person",
            &[Field::from("Name")],
            Some(&group),
            Some(&db_fields),
            None,
            None,
            &mut params,
        )
        .unwrap();

    assert_eq!(
        sql,
        "SELECT [Name] FROM [Person] WHERE ([Name] = @Name AND [Name] IS NOT NULL) ;"
    );
}

#[test]
fn insert_sqlite_returns_rowid() {
    let provider = Provider::Sqlite;
    let key = id_field(provider);
    let sql = Builder::sqlite()
        .insert("Person", &person_fields(provider), Some(&key), None)
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO [Person] ([Name], [Age]) VALUES (@Name, @Age) ; SELECT last_insert_rowid() AS [Id] ;"
    );
}

#[test]
fn insert_sql_server_returns_scope_identity() {
    let provider = Provider::SqlServer;
    let key = id_field(provider);
    let sql = Builder::sql_server()
        .insert("Person", &person_fields(provider), Some(&key), None)
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO [Person] ([Name], [Age]) VALUES (@Name, @Age) ; SELECT SCOPE_IDENTITY() AS [Id] ;"
    );
}

#[test]
fn insert_postgresql_returning() {
    let provider = Provider::PostgreSql;
    let key = id_field(provider);
    let sql = Builder::postgresql()
        .insert("Person", &person_fields(provider), Some(&key), None)
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO \"Person\" (\"Name\", \"Age\") VALUES (@Name, @Age) RETURNING \"Id\" ;"
    );
}

#[test]
fn insert_all_suffixes_rows() {
    let provider = Provider::MySql;
    let sql = Builder::mysql()
        .insert_all("Person", &person_fields(provider), None, 3, None)
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO `Person` (`Name`, `Age`) VALUES (@Name_0, @Age_0), (@Name_1, @Age_1), (@Name_2, @Age_2) ;"
    );
}

#[test]
fn insert_all_keyed_sql_server_outputs_inserted_keys() {
    let provider = Provider::SqlServer;
    let key = id_field(provider);
    let sql = Builder::sql_server()
        .insert_all("Person", &person_fields(provider), Some(&key), 2, None)
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO [Person] ([Name], [Age]) OUTPUT INSERTED.[Id] AS [Id] VALUES (@Name_0, @Age_0), (@Name_1, @Age_1) ;"
    );
}

#[test]
fn insert_all_keyed_sqlite_uses_returning() {
    let provider = Provider::Sqlite;
    let key = id_field(provider);
    let sql = Builder::sqlite()
        .insert_all("Person", &person_fields(provider), Some(&key), 2, None)
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO [Person] ([Name], [Age]) VALUES (@Name_0, @Age_0), (@Name_1, @Age_1) RETURNING [Id] ;"
    );
}

#[test]
fn insert_all_keyed_mysql_emits_one_statement_per_row() {
    let provider = Provider::MySql;
    let key = id_field(provider);
    let sql = Builder::mysql()
        .insert_all("Person", &person_fields(provider), Some(&key), 2, None)
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO `Person` (`Name`, `Age`) VALUES (@Name_0, @Age_0) ; SELECT LAST_INSERT_ID() AS `Id` ; INSERT INTO `Person` (`Name`, `Age`) VALUES (@Name_1, @Age_1) ; SELECT LAST_INSERT_ID() AS `Id` ;"
    );
}

#[test]
fn insert_batch_of_one_is_unsuffixed() {
    let provider = Provider::Sqlite;
    let sql = Builder::sqlite()
        .insert_all("Person", &person_fields(provider), None, 1, None)
        .unwrap();

    assert_eq!(sql, "INSERT INTO [Person] ([Name], [Age]) VALUES (@Name, @Age) ;");
}

#[test]
fn update_renders_set_list_and_where() {
    let provider = Provider::SqlServer;
    let group = QueryGroup::parse([("Id", 7i64)]);
    let mut params = ParamMap::new();

    let sql = Builder::sql_server()
        .update("Person", &person_fields(provider), &group, None, None, &mut params)
        .unwrap();

    assert_eq!(
        sql,
        "UPDATE [Person] SET [Name] = @Name, [Age] = @Age WHERE ([Id] = @Id) ;"
    );
    assert_eq!(params.get("Id"), Some(&Value::I64(7)));
}

#[test]
fn update_all_emits_one_statement_per_row() {
    let provider = Provider::SqlServer;
    let sql = Builder::sql_server()
        .update_all(
            "Person",
            &person_fields(provider),
            &[Field::from("Id")],
            2,
            None,
        )
        .unwrap();

    assert_eq!(
        sql,
        "UPDATE [Person] SET [Name] = @Name_0, [Age] = @Age_0 WHERE ([Id] = @Id_0) ; \
         UPDATE [Person] SET [Name] = @Name_1, [Age] = @Age_1 WHERE ([Id] = @Id_1) ;"
    );
}

#[test]
fn update_all_requires_qualifiers() {
    let provider = Provider::SqlServer;
    let err = Builder::sql_server()
        .update_all("Person", &person_fields(provider), &[], 2, None)
        .unwrap_err();

    assert!(err.is_configuration());
}

#[test]
fn delete_with_and_without_filter() {
    let group = QueryGroup::parse([("Id", 1i64)]);
    let mut params = ParamMap::new();

    let sql = Builder::sql_server()
        .delete("Person", Some(&group), None, None, &mut params)
        .unwrap();
    assert_eq!(sql, "DELETE FROM [Person] WHERE ([Id] = @Id) ;");

    let mut params = ParamMap::new();
    let sql = Builder::sql_server()
        .delete("Person", None, None, None, &mut params)
        .unwrap();
    assert_eq!(sql, "DELETE FROM [Person] ;");
}

fn merge_fields(provider: Provider) -> Vec<DbField> {
    vec![
        DbField {
            is_primary: true,
            is_nullable: false,
            ..DbField::new("Id", ValueKind::I64, provider)
        },
        DbField::new("Name", ValueKind::String, provider),
    ]
}

#[test]
fn merge_sql_server_outputs_key() {
    let provider = Provider::SqlServer;
    let key = id_field(provider);
    let sql = Builder::sql_server()
        .merge(
            "Person",
            &merge_fields(provider),
            &[Field::from("Id")],
            Some(&key),
            None,
        )
        .unwrap();

    assert_eq!(
        sql,
        "MERGE INTO [Person] AS T USING (SELECT @Id AS [Id], @Name AS [Name]) AS S \
         ON (T.[Id] = S.[Id]) \
         WHEN MATCHED THEN UPDATE SET T.[Name] = S.[Name] \
         WHEN NOT MATCHED THEN INSERT ([Id], [Name]) VALUES (S.[Id], S.[Name]) \
         OUTPUT INSERTED.[Id] AS [Id] ;"
    );
}

#[test]
fn merge_oracle_selects_from_dual() {
    let provider = Provider::Oracle;
    let sql = Builder::oracle()
        .merge(
            "Person",
            &merge_fields(provider),
            &[Field::from("Id")],
            None,
            None,
        )
        .unwrap();

    assert_eq!(
        sql,
        "MERGE INTO \"Person\" T USING (SELECT :Id AS \"Id\", :Name AS \"Name\" FROM DUAL) S \
         ON (T.\"Id\" = S.\"Id\") \
         WHEN MATCHED THEN UPDATE SET T.\"Name\" = S.\"Name\" \
         WHEN NOT MATCHED THEN INSERT (\"Id\", \"Name\") VALUES (S.\"Id\", S.\"Name\") ;"
    );
}

#[test]
fn merge_postgresql_on_conflict() {
    let provider = Provider::PostgreSql;
    let key = id_field(provider);
    let sql = Builder::postgresql()
        .merge(
            "Person",
            &merge_fields(provider),
            &[Field::from("Id")],
            Some(&key),
            None,
        )
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO \"Person\" (\"Id\", \"Name\") VALUES (@Id, @Name) \
         ON CONFLICT (\"Id\") DO UPDATE SET \"Name\" = EXCLUDED.\"Name\" RETURNING \"Id\" ;"
    );
}

#[test]
fn merge_postgresql_all_qualifiers_does_nothing() {
    let provider = Provider::PostgreSql;
    let sql = Builder::postgresql()
        .merge(
            "Person",
            &merge_fields(provider),
            &[Field::from("Id"), Field::from("Name")],
            None,
            None,
        )
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO \"Person\" (\"Id\", \"Name\") VALUES (@Id, @Name) \
         ON CONFLICT (\"Id\", \"Name\") DO NOTHING ;"
    );
}

#[test]
fn merge_all_mysql_duplicate_key() {
    let provider = Provider::MySql;
    let key = id_field(provider);
    let sql = Builder::mysql()
        .merge_all(
            "Person",
            &merge_fields(provider),
            &[Field::from("Id")],
            Some(&key),
            2,
            None,
        )
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO `Person` (`Id`, `Name`) VALUES (@Id_0, @Name_0), (@Id_1, @Name_1) \
         ON DUPLICATE KEY UPDATE `Name` = VALUES(`Name`) ; SELECT LAST_INSERT_ID() AS `Id` ;"
    );
}

#[test]
fn merge_all_sql_server_repeats_statements() {
    let provider = Provider::SqlServer;
    let sql = Builder::sql_server()
        .merge_all(
            "Person",
            &merge_fields(provider),
            &[Field::from("Id")],
            None,
            2,
            None,
        )
        .unwrap();

    assert!(sql.contains("USING (SELECT @Id_0 AS [Id], @Name_0 AS [Name])"));
    assert!(sql.contains("USING (SELECT @Id_1 AS [Id], @Name_1 AS [Name])"));
    assert_eq!(sql.matches("MERGE INTO [Person]").count(), 2);
}

#[test]
fn merge_requires_qualifiers() {
    let provider = Provider::Sqlite;
    let err = Builder::sqlite()
        .merge("Person", &merge_fields(provider), &[], None, None)
        .unwrap_err();

    assert!(err.is_configuration());
}
