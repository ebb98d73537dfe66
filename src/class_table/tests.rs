use pretty_assertions::assert_eq;

use super::{builder::build, class_table::ClassTable};
use crate::{
    ast::{
        ast::Program,
        types::{Type, OBJECT, SELF_TYPE},
    },
    errors::errors::{Error, ErrorImpl, StructuralError},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

fn build_source(source: &str) -> (ClassTable, Vec<Error>) {
    let (tokens, lex_errors) = tokenize(source);
    assert!(lex_errors.is_empty(), "{:?}", lex_errors);
    let program = parse(tokens.into_iter()).unwrap();
    build(&program).unwrap()
}

fn error_names(errors: &[Error]) -> Vec<&str> {
    errors.iter().map(Error::get_error_name).collect()
}

fn class(name: &str) -> Type {
    Type::class(name)
}

#[test]
fn test_builtins_are_registered() {
    let table = ClassTable::with_builtins();

    for name in ["Object", "IO", "Int", "Bool", "String"] {
        assert!(table.has_class(name), "missing {}", name);
        assert!(table.get_class(name).unwrap().is_builtin());
    }
    assert_eq!(table.get_class(OBJECT).unwrap().parent, None);
    assert_eq!(table.get_class("IO").unwrap().parent.as_deref(), Some(OBJECT));
}

#[test]
fn test_builtin_method_signatures() {
    let table = ClassTable::with_builtins();

    let out_string = table.lookup_method("IO", "out_string").unwrap();
    assert_eq!(out_string.return_type, SELF_TYPE);
    assert_eq!(out_string.formal_types().collect::<Vec<_>>(), vec!["String"]);

    let substr = table.lookup_method("String", "substr").unwrap();
    assert_eq!(substr.arity(), 2);
    assert_eq!(substr.return_type, "String");

    // Inherited from Object.
    let copy = table.lookup_method("Int", "copy").unwrap();
    assert_eq!(copy.defined_in, OBJECT);
    assert!(table.lookup_method("Int", "length").is_none());
}

#[test]
fn test_sealed_classes() {
    let table = ClassTable::with_builtins();
    assert!(table.is_sealed("Int"));
    assert!(table.is_sealed("Bool"));
    assert!(table.is_sealed("String"));
    assert!(!table.is_sealed("IO"));
    assert!(!table.is_sealed(OBJECT));
}

#[test]
fn test_missing_parent_defaults_to_object() {
    let (table, errors) = build_source("class C { };");

    assert!(errors.is_empty());
    let record = table.get_class("C").unwrap();
    assert_eq!(record.parent.as_deref(), Some(OBJECT));
    assert_eq!(record.declaration, Some(0));
}

#[test]
fn test_inheriting_from_sealed_class_is_rejected() {
    let (table, errors) = build_source("class A inherits Int { };");

    assert_eq!(
        errors[0].get_impl(),
        &ErrorImpl::SealedParent {
            class: String::from("A"),
            parent: String::from("Int"),
        }
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(table.get_class("A").unwrap().parent.as_deref(), Some(OBJECT));
    assert!(!table.is_subclass("A", "Int"));
}

#[test]
fn test_unknown_parent_is_reported_and_replaced() {
    let (table, errors) = build_source("class A inherits Missing { };");

    assert_eq!(error_names(&errors), vec!["UnknownParent"]);
    assert_eq!(table.get_class("A").unwrap().parent.as_deref(), Some(OBJECT));
}

#[test]
fn test_two_class_cycle_is_reported_once_and_excluded() {
    let (table, errors) = build_source("class A inherits B { }; class B inherits A { };");

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].get_impl(),
        &ErrorImpl::InheritanceCycle {
            cycle: vec![String::from("A"), String::from("B")],
        }
    );
    assert!(!table.has_class("A"));
    assert!(!table.has_class("B"));
    assert_eq!(table.excluded().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn test_self_cycle_is_a_one_element_cycle() {
    let (table, errors) = build_source("class A inherits A { };");

    assert_eq!(
        errors[0].get_impl(),
        &ErrorImpl::InheritanceCycle {
            cycle: vec![String::from("A")],
        }
    );
    assert_eq!(errors[0].message(), "inheritance cycle: A");
    assert!(!table.has_class("A"));
}

#[test]
fn test_descendants_of_a_cycle_are_excluded() {
    let source = "
        class C inherits A { };
        class A inherits B { };
        class B inherits A { };
        class D { };";
    let (table, errors) = build_source(source);

    assert_eq!(
        error_names(&errors),
        vec!["InheritanceCycle", "InheritsFromCycle"]
    );
    assert_eq!(
        errors[1].get_impl(),
        &ErrorImpl::InheritsFromCycle {
            class: String::from("C"),
            ancestor: String::from("A"),
        }
    );
    assert!(table.is_excluded("C"));
    assert!(table.has_class("D"));
}

#[test]
fn test_reserved_class_names_are_rejected() {
    let (table, errors) = build_source("class Int { }; class SELF_TYPE { }; class A { };");

    assert_eq!(
        error_names(&errors),
        vec!["ReservedClassName", "ReservedClassName"]
    );
    assert!(table.get_class("Int").unwrap().is_builtin());
    assert!(!table.has_class(SELF_TYPE));
    assert!(table.has_class("A"));
}

#[test]
fn test_redefined_class_keeps_first_declaration() {
    let (table, errors) = build_source("class A { x : Int; }; class A { y : Bool; };");

    assert_eq!(
        errors[0].get_impl(),
        &ErrorImpl::ClassRedefined {
            class: String::from("A")
        }
    );
    let record = table.get_class("A").unwrap();
    assert_eq!(record.declaration, Some(0));
    assert!(record.attribute("x").is_some());
    assert!(record.attribute("y").is_none());
}

#[test]
fn test_features_are_flattened_inherited_first() {
    let source = "
        class A { x : Int; f() : Int { 1 }; };
        class B inherits A { y : Bool; g() : Int { 2 }; };";
    let (table, errors) = build_source(source);
    assert!(errors.is_empty());

    let record = table.get_class("B").unwrap();
    let attributes: Vec<_> = record
        .attributes
        .iter()
        .map(|info| (info.name.as_str(), info.defined_in.as_str()))
        .collect();
    assert_eq!(attributes, vec![("x", "A"), ("y", "B")]);

    let methods: Vec<_> = record.methods.keys().map(String::as_str).collect();
    assert_eq!(methods, vec!["abort", "type_name", "copy", "f", "g"]);
    assert_eq!(table.lookup_method("B", "f").unwrap().defined_in, "A");
}

#[test]
fn test_child_declared_before_parent_is_flattened() {
    let (table, errors) = build_source("class B inherits A { }; class A { x : Int; };");

    assert!(errors.is_empty());
    assert!(table.get_class("B").unwrap().attribute("x").is_some());
}

#[test]
fn test_override_replaces_inherited_slot() {
    let source = "
        class A { f() : Object { 1 }; g() : Int { 2 }; };
        class B inherits A { f() : B { self }; };";
    let (table, errors) = build_source(source);
    assert!(errors.is_empty(), "{:?}", errors);

    let record = table.get_class("B").unwrap();
    let f = record.methods.get("f").unwrap();
    assert_eq!(f.defined_in, "B");
    assert_eq!(f.return_type, "B");
    assert_eq!(record.methods.get_index_of("f"), Some(3));
}

#[test]
fn test_override_arity_mismatch_keeps_inherited_signature() {
    let source = "
        class A { f(x : Int) : Int { x }; };
        class B inherits A { f() : Int { 1 }; };";
    let (table, errors) = build_source(source);

    assert_eq!(error_names(&errors), vec!["OverrideMismatch"]);
    let f = table.lookup_method("B", "f").unwrap();
    assert_eq!(f.defined_in, "A");
    assert_eq!(f.arity(), 1);
}

#[test]
fn test_override_must_keep_formal_types() {
    let source = "
        class A { f(x : Int) : Int { x }; };
        class B inherits A { f(x : Bool) : Int { 1 }; };";
    let (_, errors) = build_source(source);

    assert_eq!(error_names(&errors), vec!["OverrideMismatch"]);
    assert!(errors[0].message().contains("formal parameter 1 has type Bool"));
}

#[test]
fn test_override_return_type_must_conform() {
    let source = "
        class A { f() : Int { 1 }; };
        class B inherits A { f() : Object { 1 }; };";
    let (_, errors) = build_source(source);

    assert_eq!(error_names(&errors), vec!["OverrideMismatch"]);
}

#[test]
fn test_override_may_return_a_class_flattened_later() {
    let source = "
        class A { f() : A { self }; };
        class B inherits A { f() : C { new C }; };
        class C inherits A { };";
    let (table, errors) = build_source(source);

    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(table.lookup_method("B", "f").unwrap().defined_in, "B");
}

#[test]
fn test_override_return_type_follows_unflattened_ancestry() {
    let source = "
        class A { f() : A { self }; };
        class B inherits A { f() : D { new D }; };
        class D inherits C { };
        class C inherits A { };";
    let (table, errors) = build_source(source);

    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(table.lookup_method("B", "f").unwrap().return_type, "D");
}

#[test]
fn test_override_returning_unrelated_later_class_is_rejected() {
    let source = "
        class A { f() : A { self }; };
        class B inherits A { f() : E { new E }; };
        class E inherits F { };
        class F { };";
    let (table, errors) = build_source(source);

    assert_eq!(error_names(&errors), vec!["OverrideMismatch"]);
    assert_eq!(table.lookup_method("B", "f").unwrap().defined_in, "A");
}

#[test]
fn test_override_with_self_type_return() {
    let source = "
        class A { me() : SELF_TYPE { self }; other() : A { self }; };
        class B inherits A { me() : SELF_TYPE { self }; other() : SELF_TYPE { self }; };";
    let (_, errors) = build_source(source);

    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn test_redeclaring_inherited_attribute_is_rejected() {
    let source = "class A { x : Int; }; class B inherits A { x : Int; };";
    let (table, errors) = build_source(source);

    assert_eq!(
        errors[0].get_impl(),
        &ErrorImpl::InheritedAttributeRedefined {
            class: String::from("B"),
            attribute: String::from("x"),
            ancestor: String::from("A"),
        }
    );
    assert_eq!(table.get_class("B").unwrap().attributes.len(), 1);
}

#[test]
fn test_duplicate_features_within_a_class() {
    let source = "class A { x : Int; x : Bool; f() : Int { 1 }; f() : Int { 2 }; };";
    let (_, errors) = build_source(source);

    assert_eq!(
        error_names(&errors),
        vec!["AttributeRedefined", "MethodRedefined"]
    );
}

#[test]
fn test_formal_parameter_rules() {
    let source = "class A { f(a : Int, a : Int, self : Int, b : SELF_TYPE) : Int { 1 }; };";
    let (_, errors) = build_source(source);

    assert_eq!(
        error_names(&errors),
        vec!["FormalRedefined", "IllegalSelfBinding", "SelfTypeFormal"]
    );
}

#[test]
fn test_attribute_named_self_is_rejected() {
    let (table, errors) = build_source("class A { self : Int; };");

    assert_eq!(error_names(&errors), vec!["IllegalSelfBinding"]);
    assert!(table.get_class("A").unwrap().attributes.is_empty());
}

#[test]
fn test_empty_program_is_structural_error() {
    assert_eq!(
        build(&Program::new(vec![])).unwrap_err(),
        StructuralError::EmptyProgram
    );
}

#[test]
fn test_superclass_chain_ends_at_object() {
    let (table, _) = build_source("class A { }; class B inherits A { }; class C inherits B { };");

    assert_eq!(table.superclass_chain("C"), vec!["C", "B", "A", "Object"]);
    assert_eq!(table.superclass_chain("Object"), vec!["Object"]);
    assert!(table.superclass_chain("Missing").is_empty());
}

#[test]
fn test_conformance_is_reflexive_and_transitive() {
    let (table, _) = build_source("class A { }; class B inherits A { }; class C inherits B { };");

    for name in ["Object", "IO", "Int", "A", "B", "C"] {
        assert!(table.conforms(&class(name), &class(name)));
    }
    assert!(table.conforms(&class("C"), &class("B")));
    assert!(table.conforms(&class("B"), &class("A")));
    assert!(table.conforms(&class("C"), &class("A")));
    assert!(table.conforms(&class("C"), &class(OBJECT)));
    assert!(!table.conforms(&class("A"), &class("C")));
    assert!(!table.conforms(&class("Int"), &class("A")));
}

#[test]
fn test_self_type_conformance() {
    let (table, _) = build_source("class A { }; class B inherits A { };");
    let self_b = Type::SelfType(String::from("B"));

    assert!(table.conforms(&self_b, &class("B")));
    assert!(table.conforms(&self_b, &class("A")));
    assert!(table.conforms(&self_b, &self_b));
    assert!(!table.conforms(&class("B"), &self_b));
    assert!(!table.conforms(&self_b, &Type::SelfType(String::from("A"))));
}

#[test]
fn test_void_and_error_conformance() {
    let (table, _) = build_source("class A { };");

    assert!(table.conforms(&Type::Void, &class("A")));
    assert!(table.conforms(&Type::Void, &class(OBJECT)));
    assert!(!table.conforms(&Type::Void, &class("Int")));
    assert!(!table.conforms(&class("A"), &Type::Void));
    assert!(table.conforms(&Type::Error, &class("Int")));
    assert!(table.conforms(&class("Int"), &Type::Error));
}

#[test]
fn test_join_of_siblings_is_their_parent() {
    let (table, _) = build_source("class A { }; class B inherits A { }; class C inherits A { };");

    assert_eq!(table.join(&class("B"), &class("C")), class("A"));
    assert_eq!(table.join(&class("B"), &class("A")), class("A"));
    assert_eq!(table.join(&class("Int"), &class("B")), class(OBJECT));
}

#[test]
fn test_join_is_commutative_and_idempotent() {
    let (table, _) = build_source(
        "class A { }; class B inherits A { }; class C inherits A { }; class D inherits B { };",
    );
    let types = [
        class("A"),
        class("B"),
        class("C"),
        class("D"),
        class("Int"),
        class("IO"),
        Type::SelfType(String::from("D")),
        Type::Void,
        Type::Error,
    ];

    for a in &types {
        assert_eq!(&table.join(a, a), a);
        for b in &types {
            assert_eq!(table.join(a, b), table.join(b, a), "join({}, {})", a, b);
        }
    }
}

#[test]
fn test_join_resolves_self_types() {
    let (table, _) = build_source("class A { }; class B inherits A { }; class C inherits A { };");
    let self_b = Type::SelfType(String::from("B"));

    assert_eq!(table.join(&self_b, &self_b), self_b);
    assert_eq!(table.join(&self_b, &class("C")), class("A"));
    assert_eq!(table.join(&self_b, &class("B")), class("B"));
}

#[test]
fn test_join_identities() {
    let (table, _) = build_source("class A { };");

    assert_eq!(table.join(&Type::Error, &class("A")), class("A"));
    assert_eq!(table.join(&Type::Void, &class("A")), class("A"));
    assert_eq!(table.join(&Type::Void, &class("Int")), class(OBJECT));
}

#[test]
fn test_class_table_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClassTable>();
}
