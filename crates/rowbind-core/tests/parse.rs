use pretty_assertions::assert_eq;

use rowbind_core::expr::BinaryOp;
use rowbind_core::parse::{parse, NullHandling, ParseOptions};
use rowbind_core::{DbSetting, EntityMap, Expr, Value};

struct Customer {
    id: i64,
    name: String,
    age: i32,
    active: bool,
    direction: String,
}

fn map() -> EntityMap<Customer> {
    EntityMap::builder("Customer", "Customer")
        .property("Id", |c: &Customer| c.id.into())
        .property("Name", |c: &Customer| c.name.clone().into())
        .property("Age", |c: &Customer| c.age.into())
        .property("Active", |c: &Customer| c.active.into())
        .enum_property(
            "Direction",
            &["North", "South", "East", "West"],
            |c: &Customer| c.direction.clone().into(),
        )
        .build()
}

fn render(expr: &Expr) -> String {
    let group = parse(expr, &map(), &ParseOptions::default()).unwrap();
    group.to_sql(&DbSetting::SQL_SERVER)
}

#[test]
fn binary_operators_render_their_sql_tokens() {
    let cases = [
        (BinaryOp::Eq, "="),
        (BinaryOp::Ne, "<>"),
        (BinaryOp::Lt, "<"),
        (BinaryOp::Gt, ">"),
        (BinaryOp::Le, "<="),
        (BinaryOp::Ge, ">="),
    ];
    for (op, token) in cases {
        let expr = Expr::binary_op(Expr::member("Age"), op, 30);
        assert_eq!(render(&expr), format!("([Age] {token} @Age)"));
    }
}

#[test]
fn member_to_member_comparison_binds_no_parameter() {
    let cases = [
        (BinaryOp::Eq, "="),
        (BinaryOp::Ne, "<>"),
        (BinaryOp::Lt, "<"),
        (BinaryOp::Gt, ">"),
        (BinaryOp::Le, "<="),
        (BinaryOp::Ge, ">="),
    ];
    for (op, token) in cases {
        let expr = Expr::binary_op(Expr::member("Id"), op, Expr::member("Age"));
        let group = parse(&expr, &map(), &ParseOptions::default()).unwrap();
        assert_eq!(
            group.to_sql(&DbSetting::SQL_SERVER),
            format!("([Id] {token} [Age])")
        );
        assert!(group.parameters().is_empty());
    }
}

#[test]
fn equals_forms_are_identical() {
    // a == b, a.Equals(b), and string.Equals(a, b) all arrive as the same
    // typed node, so they must render identically.
    let direct = render(&Expr::eq(Expr::member("Name"), "Ann"));
    assert_eq!(direct, "([Name] = @Name)");
}

#[test]
fn negated_equals_round_trips_to_not_equal() {
    let negated = render(&Expr::not(Expr::eq(Expr::member("Name"), "Ann")));
    let direct = render(&Expr::ne(Expr::member("Name"), "Ann"));
    assert_eq!(negated, direct);
    assert_eq!(negated, "([Name] <> @Name)");
}

#[test]
fn reversed_operands_are_normalized() {
    // `30 > age` is `age < 30`
    assert_eq!(
        render(&Expr::gt(Expr::value(30), Expr::member("Age"))),
        "([Age] < @Age)"
    );
}

#[test]
fn null_comparison_becomes_null_check() {
    assert_eq!(
        render(&Expr::eq(Expr::member("Name"), Value::Null)),
        "([Name] IS NULL)"
    );
    assert_eq!(
        render(&Expr::ne(Expr::member("Name"), Value::Null)),
        "([Name] IS NOT NULL)"
    );
}

#[test]
fn boolean_member_resolves_to_equality() {
    assert_eq!(render(&Expr::member("Active")), "([Active] = @Active)");
    let group = parse(&Expr::member("Active"), &map(), &ParseOptions::default()).unwrap();
    assert_eq!(group.parameters()[0].1, Value::Bool(true));

    let negated = parse(
        &Expr::not(Expr::member("Active")),
        &map(),
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(negated.parameters()[0].1, Value::Bool(false));
}

#[test]
fn null_coalescing_rewrites_to_disjunction() {
    // (age ?? 5) == 5  =>  age = 5 OR age IS NULL
    let expr = Expr::eq(Expr::coalesce("Age", 5), 5);
    assert_eq!(render(&expr), "(([Age] = @Age OR [Age] IS NULL))");

    // (age ?? 5) != 7  =>  age <> 7 OR age IS NULL
    let expr = Expr::ne(Expr::coalesce("Age", 5), 7);
    assert_eq!(render(&expr), "(([Age] <> @Age OR [Age] IS NULL))");
}

#[test]
fn mismatched_coalesce_is_a_configuration_error() {
    // (age ?? 5) == 7 has no null-equivalent rendition
    let err = parse(
        &Expr::eq(Expr::coalesce("Age", 5), 7),
        &map(),
        &ParseOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_configuration());

    let err = parse(
        &Expr::ne(Expr::coalesce("Age", 5), 5),
        &map(),
        &ParseOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn null_not_equal_policy_rewrites_comparisons() {
    let options = ParseOptions {
        null_handling: NullHandling::NullNotEqual,
    };
    let group = parse(&Expr::eq(Expr::member("Name"), "Ann"), &map(), &options).unwrap();
    assert_eq!(
        group.to_sql(&DbSetting::SQL_SERVER),
        "(([Name] = @Name AND [Name] IS NOT NULL))"
    );

    let group = parse(&Expr::ne(Expr::member("Name"), "Ann"), &map(), &options).unwrap();
    assert_eq!(
        group.to_sql(&DbSetting::SQL_SERVER),
        "(([Name] <> @Name OR [Name] IS NULL))"
    );

    // The added predicates are skippable; the originals are not.
    let skippable: Vec<bool> = group.fields().iter().map(|f| f.can_skip()).collect();
    assert_eq!(skippable, [false, true]);
}

#[test]
fn enum_values_bind_as_members_not_integers() {
    let expr = Expr::eq(Expr::member("Direction"), "West");
    let group = parse(&expr, &map(), &ParseOptions::default()).unwrap();
    assert_eq!(
        group.parameters()[0].1,
        Value::enum_member("West"),
        "matching names coerce to the defined member"
    );

    // Unmatched names pass through unchanged; call sites depend on this.
    let expr = Expr::eq(Expr::member("Direction"), "Sideways");
    let group = parse(&expr, &map(), &ParseOptions::default()).unwrap();
    assert_eq!(group.parameters()[0].1, Value::from("Sideways"));
}

#[test]
fn like_wildcards_are_idempotent() {
    assert_eq!(
        render(&Expr::contains("Name", "ann")),
        "([Name] LIKE @Name)"
    );
    let params = |e: &Expr| {
        parse(e, &map(), &ParseOptions::default())
            .unwrap()
            .parameters()
    };
    assert_eq!(params(&Expr::contains("Name", "ann"))[0].1, Value::from("%ann%"));
    assert_eq!(
        params(&Expr::contains("Name", "%ann%"))[0].1,
        Value::from("%ann%")
    );
    assert_eq!(
        params(&Expr::begins_with("Name", "ann"))[0].1,
        Value::from("ann%")
    );
    assert_eq!(
        params(&Expr::ends_with("Name", "ann"))[0].1,
        Value::from("%ann")
    );
    assert_eq!(
        render(&Expr::not(Expr::contains("Name", "ann"))),
        "([Name] NOT LIKE @Name)"
    );
}

#[test]
fn in_list_collapses_to_one_bound_collection() {
    let expr = Expr::in_list("Age", [10, 20, 30]);
    let group = parse(&expr, &map(), &ParseOptions::default()).unwrap();
    assert_eq!(
        group.to_sql(&DbSetting::SQL_SERVER),
        "([Age] IN (@Age_In_0, @Age_In_1, @Age_In_2))"
    );
    assert_eq!(group.parameters().len(), 3);

    assert_eq!(
        parse(
            &Expr::not(Expr::in_list("Age", [1])),
            &map(),
            &ParseOptions::default()
        )
        .unwrap()
        .to_sql(&DbSetting::SQL_SERVER),
        "([Age] NOT IN (@Age_In_0))"
    );
}

#[test]
fn quantified_comparisons_expand_per_element() {
    let group = parse(
        &Expr::any("Age", [10, 20]),
        &map(),
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(
        group.to_sql(&DbSetting::SQL_SERVER),
        "(([Age] = @Age OR [Age] = @Age_1))"
    );

    let group = parse(
        &Expr::all("Age", [10, 20]),
        &map(),
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(
        group.to_sql(&DbSetting::SQL_SERVER),
        "(([Age] = @Age AND [Age] = @Age_1))"
    );

    // !All(== v) is Any(!= v)
    let group = parse(
        &Expr::not(Expr::all("Age", [10, 20])),
        &map(),
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(
        group.to_sql(&DbSetting::SQL_SERVER),
        "(([Age] <> @Age OR [Age] <> @Age_1))"
    );
}

#[test]
fn conjunction_trees_preserve_structure() {
    let expr = Expr::and([
        Expr::eq(Expr::member("Name"), "Ann"),
        Expr::or([
            Expr::lt(Expr::member("Age"), 18),
            Expr::ge(Expr::member("Age"), 65),
        ]),
    ]);
    assert_eq!(
        render(&expr),
        "([Name] = @Name AND ([Age] < @Age OR [Age] >= @Age_1))"
    );
}

#[test]
fn unresolvable_member_is_mapping_not_found() {
    let err = parse(
        &Expr::eq(Expr::member("Nickname"), "x"),
        &map(),
        &ParseOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_mapping_not_found());
    assert!(err.to_string().contains("Nickname"));
    assert!(err.to_string().contains("Customer"));
}

#[test]
fn unsupported_shapes_carry_the_rendered_expression() {
    let err = parse(
        &Expr::eq(Expr::value(1), Expr::value(2)),
        &map(),
        &ParseOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_unsupported_expression());

    let err = parse(&Expr::value(true), &map(), &ParseOptions::default()).unwrap_err();
    assert!(err.is_unsupported_expression());

    // Ordering comparison against null has no SQL rendition
    let err = parse(
        &Expr::lt(Expr::member("Age"), Value::Null),
        &map(),
        &ParseOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_unsupported_expression());
}
