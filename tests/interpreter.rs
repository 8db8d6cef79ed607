use rox::error::{LoxError, RuntimeError};
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::resolver::Resolver;
use rox::scanner::Scanner;

fn run_into(source: &str, out: &mut Vec<u8>) -> Result<(), LoxError> {
    let scanner = Scanner::new(source.as_bytes().to_vec());
    let mut parser = Parser::new(scanner);
    let statements = parser.parse()?;

    let mut interpreter = Interpreter::new(out);

    let mut resolver = Resolver::new(&mut interpreter);
    resolver.resolve(&statements)?;

    interpreter.interpret(&statements)
}

fn run(source: &str) -> Result<String, LoxError> {
    let mut out: Vec<u8> = Vec::new();
    run_into(source, &mut out)?;
    Ok(String::from_utf8(out).expect("interpreter output is valid UTF-8"))
}

// ─────────────────────────────────────────────────────────────────────────
// Plain evaluation
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn arithmetic_and_integral_stringification() {
    assert_eq!(run("print 1 + 2 * 3;").unwrap(), "7\n");
    assert_eq!(run("print 4 / 2;").unwrap(), "2\n");
    assert_eq!(run("print 5 / 2;").unwrap(), "2.5\n");
    assert_eq!(run("print -7;").unwrap(), "-7\n");
    assert_eq!(run("print 2.5 + 2.5;").unwrap(), "5\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(run("print \"foo\" + \"bar\";").unwrap(), "foobar\n");
    assert_eq!(run("print \"n=\" + 3;").unwrap(), "n=3\n");
    assert_eq!(run("print \"n=\" + 3.5;").unwrap(), "n=3.5\n");
}

#[test]
fn equality_and_comparison() {
    assert_eq!(run("print 1 == 1;").unwrap(), "true\n");
    assert_eq!(run("print 1 == \"1\";").unwrap(), "false\n");
    assert_eq!(run("print nil == nil;").unwrap(), "true\n");
    assert_eq!(run("print 1 < 2;").unwrap(), "true\n");
    assert_eq!(run("print 2 <= 1;").unwrap(), "false\n");
    assert_eq!(run("print !nil;").unwrap(), "true\n");
}

#[test]
fn logical_operators_short_circuit() {
    let source = r#"
        var called = false;
        fun mark() { called = true; return true; }
        print true or mark();
        print called;
        print false and mark();
        print called;
    "#;
    assert_eq!(run(source).unwrap(), "true\nfalse\nfalse\nfalse\n");
}

#[test]
fn if_else_branches_on_truthiness() {
    assert_eq!(run("if (0) print \"yes\"; else print \"no\";").unwrap(), "yes\n");
    assert_eq!(run("if (nil) print \"yes\"; else print \"no\";").unwrap(), "no\n");
}

#[test]
fn clock_returns_a_number() {
    assert_eq!(run("print clock() > 0;").unwrap(), "true\n");
}

// ─────────────────────────────────────────────────────────────────────────
// Scoping and closures
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn blocks_shadow_without_leaking() {
    let source = r#"
        var a = "outer";
        {
            var a = "inner";
            print a;
        }
        print a;
    "#;
    assert_eq!(run(source).unwrap(), "inner\nouter\n");
}

#[test]
fn writes_to_outer_names_survive_the_block() {
    let source = r#"
        var a = 1;
        {
            a = 2;
        }
        print a;
    "#;
    assert_eq!(run(source).unwrap(), "2\n");
}

#[test]
fn closure_counter() {
    let source = r#"
        fun makeCounter() { var i = 0; fun c() { i = i + 1; print i; } return c; }
        var c = makeCounter(); c(); c();
    "#;
    assert_eq!(run(source).unwrap(), "1\n2\n");
}

#[test]
fn counters_are_independent() {
    let source = r#"
        fun makeCounter() { var i = 0; fun c() { i = i + 1; return i; } return c; }
        var a = makeCounter();
        var b = makeCounter();
        a(); a();
        print a();
        print b();
    "#;
    assert_eq!(run(source).unwrap(), "3\n1\n");
}

#[test]
fn closures_observe_later_mutation() {
    let source = r#"
        var x = 1;
        fun show() { print x; }
        x = 2;
        show();
    "#;
    assert_eq!(run(source).unwrap(), "2\n");
}

// A captured reference keeps pointing at the frame it was resolved in, even
// after a later declaration introduces the same name closer by.
#[test]
fn resolved_distances_pin_the_declaration_frame() {
    let source = r#"
        var a = "global";
        {
            fun show() { print a; }
            show();
            var a = "block";
            show();
        }
    "#;
    assert_eq!(run(source).unwrap(), "global\nglobal\n");
}

#[test]
fn recursion() {
    let source = r#"
        fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
        print fib(10);
    "#;
    assert_eq!(run(source).unwrap(), "55\n");
}

#[test]
fn functions_without_return_produce_nil() {
    assert_eq!(run("fun f() {} print f();").unwrap(), "nil\n");
    assert_eq!(run("fun f() { return; } print f();").unwrap(), "nil\n");
}

#[test]
fn function_values_print_their_name() {
    assert_eq!(run("fun f() {} print f;").unwrap(), "<fn f>\n");
}

// ─────────────────────────────────────────────────────────────────────────
// Loops and break
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn while_loops() {
    let source = r#"
        var i = 0;
        var sum = 0;
        while (i < 5) { i = i + 1; sum = sum + i; }
        print sum;
    "#;
    assert_eq!(run(source).unwrap(), "15\n");
}

#[test]
fn for_loops_desugar_and_run() {
    assert_eq!(
        run("for (var i = 0; i < 3; i = i + 1) print i;").unwrap(),
        "0\n1\n2\n"
    );
}

#[test]
fn break_exits_only_the_innermost_loop() {
    let source = r#"
        var i = 0;
        while (i < 3) {
            var j = 0;
            while (j < 3) { if (j == 1) break; j = j + 1; }
            i = i + 1;
        }
        print i;
    "#;
    assert_eq!(run(source).unwrap(), "3\n");
}

#[test]
fn break_inside_for_loop() {
    let source = r#"
        for (var i = 0; i < 10; i = i + 1) {
            if (i == 2) break;
            print i;
        }
    "#;
    assert_eq!(run(source).unwrap(), "0\n1\n");
}

// ─────────────────────────────────────────────────────────────────────────
// Classes
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn fields_and_methods() {
    let source = r#"
        class Pair {
            sum() { return this.a + this.b; }
        }
        var p = Pair();
        p.a = 1;
        p.b = 2;
        print p.sum();
    "#;
    assert_eq!(run(source).unwrap(), "3\n");
}

#[test]
fn initializer_stores_fields() {
    let source = r#"
        class P { init(x) { this.x = x; } }
        var p = P(7); print p.x;
    "#;
    assert_eq!(run(source).unwrap(), "7\n");
}

#[test]
fn constructor_returns_instance_even_on_early_return() {
    let source = r#"
        class Q { init() { return; } }
        print Q();
    "#;
    assert_eq!(run(source).unwrap(), "Q instance\n");
}

#[test]
fn calling_init_directly_returns_the_same_instance() {
    let source = r#"
        class P { init() { this.x = 1; } }
        var p = P();
        print p.init() == p;
    "#;
    assert_eq!(run(source).unwrap(), "true\n");
}

#[test]
fn fields_shadow_methods() {
    let source = r#"
        class C { m() { return "method"; } }
        var c = C();
        fun field() { return "field"; }
        c.m = field;
        print c.m();
    "#;
    assert_eq!(run(source).unwrap(), "field\n");
}

#[test]
fn extracted_methods_stay_bound() {
    let source = r#"
        class C {
            init() { this.v = 5; }
            get() { return this.v; }
        }
        var c = C();
        var m = c.get;
        print m();
    "#;
    assert_eq!(run(source).unwrap(), "5\n");
}

#[test]
fn class_values_print_their_name() {
    assert_eq!(run("class C {} print C;").unwrap(), "C\n");
    assert_eq!(run("class C {} print C();").unwrap(), "C instance\n");
}

// ─────────────────────────────────────────────────────────────────────────
// Inheritance
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn methods_are_inherited() {
    let source = r#"
        class A { speak() { print "A"; } }
        class B < A {}
        B().speak();
    "#;
    assert_eq!(run(source).unwrap(), "A\n");
}

#[test]
fn super_calls_the_parent_method() {
    let source = r#"
        class A { speak() { print "A"; } }
        class B < A { speak() { super.speak(); print "B"; } }
        B().speak();
    "#;
    assert_eq!(run(source).unwrap(), "A\nB\n");
}

// `super` is lexical: it starts above the class that *declares* the method,
// not above the receiver's dynamic class.
#[test]
fn super_skips_the_dynamic_override() {
    let source = r#"
        class A { m() { return "A"; } }
        class B < A { m() { return "B"; } test() { return super.m(); } }
        class C < B { m() { return "C"; } }
        print C().test();
    "#;
    assert_eq!(run(source).unwrap(), "A\n");
}

#[test]
fn initializer_arity_is_inherited() {
    let source = r#"
        class A { init(x) { this.x = x; } }
        class B < A {}
        print B(9).x;
    "#;
    assert_eq!(run(source).unwrap(), "9\n");
}

// ─────────────────────────────────────────────────────────────────────────
// Runtime errors
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn division_by_zero_produces_no_output() {
    let mut out: Vec<u8> = Vec::new();
    let result = run_into("print 1/0;", &mut out);

    assert!(matches!(
        result,
        Err(LoxError::Runtime(RuntimeError::DivisionByZero { .. }))
    ));
    assert!(out.is_empty());
}

#[test]
fn type_mismatches() {
    assert!(matches!(
        run("print -\"x\";"),
        Err(LoxError::Runtime(RuntimeError::TypeMismatch { .. }))
    ));
    assert!(matches!(
        run("print 1 < \"2\";"),
        Err(LoxError::Runtime(RuntimeError::TypeMismatch { .. }))
    ));
    assert!(matches!(
        run("print 1 + \"x\";"),
        Err(LoxError::Runtime(RuntimeError::TypeMismatch { .. }))
    ));
}

#[test]
fn undefined_variable() {
    assert!(matches!(
        run("print missing;"),
        Err(LoxError::Runtime(RuntimeError::UndefinedVariable { .. }))
    ));
    assert!(matches!(
        run("missing = 1;"),
        Err(LoxError::Runtime(RuntimeError::UndefinedVariable { .. }))
    ));
}

#[test]
fn undefined_property() {
    assert!(matches!(
        run("class C {} print C().missing;"),
        Err(LoxError::Runtime(RuntimeError::UndefinedProperty { .. }))
    ));
}

#[test]
fn super_to_a_missing_method_is_undefined_property() {
    let source = r#"
        class A {}
        class B < A { m() { return super.missing(); } }
        B().m();
    "#;
    assert!(matches!(
        run(source),
        Err(LoxError::Runtime(RuntimeError::UndefinedProperty { .. }))
    ));
}

#[test]
fn only_callables_can_be_called() {
    assert!(matches!(
        run("var x = 1; x();"),
        Err(LoxError::Runtime(RuntimeError::NotCallable { .. }))
    ));
}

#[test]
fn arity_is_checked() {
    assert!(matches!(
        run("fun f(a, b) {} f(1);"),
        Err(LoxError::Runtime(RuntimeError::ArityMismatch { .. }))
    ));
    assert!(matches!(
        run("class C { init(a) {} } C();"),
        Err(LoxError::Runtime(RuntimeError::ArityMismatch { .. }))
    ));
}

#[test]
fn superclass_must_be_a_class() {
    assert!(matches!(
        run("var NotAClass = 1; class C < NotAClass {}"),
        Err(LoxError::Runtime(RuntimeError::SuperclassNotClass { .. }))
    ));
}

#[test]
fn property_access_requires_an_instance() {
    assert!(matches!(
        run("print 4.x;"),
        Err(LoxError::Runtime(
            RuntimeError::FieldAccessOnNonInstance { .. }
        ))
    ));
    assert!(matches!(
        run("4.x = 1;"),
        Err(LoxError::Runtime(
            RuntimeError::FieldAccessOnNonInstance { .. }
        ))
    ));
}

#[test]
fn runtime_errors_halt_remaining_statements() {
    let mut out: Vec<u8> = Vec::new();
    let result = run_into("print 1; print missing; print 2;", &mut out);

    assert!(result.is_err());
    assert_eq!(String::from_utf8(out).unwrap(), "1\n");
}

// ─────────────────────────────────────────────────────────────────────────
// Static (resolver) errors
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn return_outside_a_function_is_rejected() {
    assert!(matches!(run("return 1;"), Err(LoxError::Resolve { .. })));
}

#[test]
fn returning_a_value_from_an_initializer_is_rejected() {
    assert!(matches!(
        run("class C { init() { return 1; } }"),
        Err(LoxError::Resolve { .. })
    ));
}

#[test]
fn this_outside_a_class_is_rejected() {
    assert!(matches!(run("print this;"), Err(LoxError::Resolve { .. })));
    assert!(matches!(
        run("fun f() { return this; }"),
        Err(LoxError::Resolve { .. })
    ));
}

#[test]
fn super_requires_a_subclass() {
    assert!(matches!(
        run("class C { m() { super.m(); } }"),
        Err(LoxError::Resolve { .. })
    ));
    assert!(matches!(
        run("fun f() { super.m(); }"),
        Err(LoxError::Resolve { .. })
    ));
}

#[test]
fn break_outside_a_loop_is_rejected() {
    assert!(matches!(run("break;"), Err(LoxError::Resolve { .. })));
    assert!(matches!(
        run("while (true) { fun f() { break; } }"),
        Err(LoxError::Resolve { .. })
    ));
}

#[test]
fn self_initialization_is_rejected() {
    assert!(matches!(
        run("{ var a = a; }"),
        Err(LoxError::Resolve { .. })
    ));
}

#[test]
fn local_redeclaration_is_rejected() {
    assert!(matches!(
        run("{ var a = 1; var a = 2; }"),
        Err(LoxError::Resolve { .. })
    ));
    // Globals may be redefined freely.
    assert_eq!(run("var a = 1; var a = 2; print a;").unwrap(), "2\n");
}

#[test]
fn a_class_cannot_inherit_from_itself() {
    assert!(matches!(
        run("class C < C {}"),
        Err(LoxError::Resolve { .. })
    ));
}
