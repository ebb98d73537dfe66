use tracing::{debug, instrument, trace};

use crate::{
    ast::{
        ast::{Attribute, Class, Feature, Method, Program},
        expressions::{CaseArm, ComparisonOp, Expr, ExprKind, LetBinding},
        types::{Type, BOOL, INT, OBJECT, SELF_TYPE, STRING},
    },
    class_table::class_table::{ClassTable, MethodSignature},
    errors::errors::{Error, ErrorImpl, StructuralError},
    Position,
};

use super::{environment::Environment, typed_ast::TypedProgram};

/// Checks the expressions of a single class against a shared class table.
struct TypeChecker<'a> {
    table: &'a ClassTable,
    class_name: &'a str,
    errors: Vec<Error>,
}

impl<'a> TypeChecker<'a> {
    fn new(table: &'a ClassTable, class_name: &'a str) -> Self {
        TypeChecker {
            table,
            class_name,
            errors: vec![],
        }
    }

    fn error(&mut self, error: ErrorImpl, position: Position) {
        self.errors.push(Error::new(error, position));
    }

    fn self_type(&self) -> Type {
        Type::SelfType(self.class_name.to_string())
    }

    /// The static type named by a declaration, reporting unknown names.
    fn declared_type(&mut self, type_name: &str, position: Position) -> Type {
        if self.table.is_known_type(type_name) {
            Type::from_annotation(type_name, self.class_name)
        } else {
            self.error(
                ErrorImpl::UnknownType {
                    type_: type_name.to_string(),
                },
                position,
            );
            Type::Error
        }
    }

    /// Like [`Self::declared_type`], for names already reported elsewhere.
    fn annotation_type(&self, type_name: &str) -> Type {
        if self.table.is_known_type(type_name) {
            Type::from_annotation(type_name, self.class_name)
        } else {
            Type::Error
        }
    }

    fn conforms(&self, sub: &Type, sup: &Type) -> bool {
        self.table.conforms(sub, sup)
    }

    /// Reports `found` unless it conforms to `expected`. Returns whether it
    /// conformed.
    fn expect_conforms(&mut self, found: &Type, expected: &Type, position: Position) -> bool {
        if self.conforms(found, expected) {
            return true;
        }
        self.error(
            ErrorImpl::TypeMatchError {
                expected: expected.to_string(),
                received: found.to_string(),
            },
            position,
        );
        false
    }

    /// The environment every feature of the class starts from.
    fn class_environment(&self) -> Environment {
        let mut env = Environment::new();
        if let Some(record) = self.table.get_class(self.class_name) {
            for attribute in &record.attributes {
                env = env.push(&attribute.name, self.annotation_type(&attribute.type_name));
            }
        }
        env
    }

    fn check_attribute(&mut self, attribute: &mut Attribute, env: &Environment) {
        let declared = self.declared_type(&attribute.type_name, attribute.span.start);
        let Some(init) = attribute.init.as_mut() else {
            return;
        };

        let found = self.check_expr(init, env);
        self.expect_conforms(&found, &declared, init.span.start);
    }

    fn check_method(&mut self, method: &mut Method, env: &Environment) {
        let mut env = env.clone();
        for formal in &method.formals {
            // Self bindings and SELF_TYPE formals are reported with the hierarchy.
            if formal.name == "self" {
                continue;
            }
            let formal_type = if formal.type_name == SELF_TYPE {
                Type::Error
            } else {
                self.declared_type(&formal.type_name, formal.span.start)
            };
            env = env.push(&formal.name, formal_type);
        }
        let env = env.push("self", self.self_type());

        let return_type = self.declared_type(&method.return_type, method.span.start);
        let found = self.check_expr(&mut method.body, &env);
        self.expect_conforms(&found, &return_type, method.body.span.start);
        trace!("{}.{} : {}", self.class_name, method.name, found);
    }

    /// Infers the type of `expr` and its sub-expressions, storing each in
    /// the node.
    fn check_expr(&mut self, expr: &mut Expr, env: &Environment) -> Type {
        let position = expr.span.start;

        let static_type = match &mut expr.kind {
            ExprKind::Identifier(name) => match env.lookup(name) {
                Ok(found) => found.clone(),
                Err(error) => {
                    self.error(error, position);
                    Type::Error
                }
            },
            ExprKind::SelfRef => self.self_type(),
            ExprKind::Integer(_) => Type::class(INT),
            ExprKind::Str(_) => Type::class(STRING),
            ExprKind::Boolean(_) => Type::class(BOOL),
            ExprKind::New(type_name) => {
                let type_name = type_name.clone();
                self.declared_type(&type_name, position)
            }
            ExprKind::IsVoid(inner) => {
                self.check_expr(inner, env);
                Type::class(BOOL)
            }
            ExprKind::Assign { name, value } => {
                let found = self.check_expr(value, env);
                if name.as_str() == "self" {
                    self.error(ErrorImpl::AssignToSelf, position);
                    Type::Error
                } else {
                    match env.lookup(name) {
                        Ok(declared) => {
                            let declared = declared.clone();
                            if self.expect_conforms(&found, &declared, value.span.start) {
                                found
                            } else {
                                Type::Error
                            }
                        }
                        Err(error) => {
                            self.error(error, position);
                            Type::Error
                        }
                    }
                }
            }
            ExprKind::Block(body) => {
                let mut last = Type::Void;
                for inner in body.iter_mut() {
                    last = self.check_expr(inner, env);
                }
                last
            }
            ExprKind::Dispatch {
                receiver,
                method,
                args,
            } => {
                let receiver_type = self.check_expr(receiver, env);
                let arg_types = self.check_args(args, env);
                // A void receiver is only known to be an Object.
                let lookup_class = match &receiver_type {
                    Type::Class(name) | Type::SelfType(name) => Some(name.clone()),
                    Type::Void => Some(OBJECT.to_string()),
                    Type::Error => None,
                };
                match lookup_class {
                    Some(lookup_class) => self.check_dispatch(
                        &receiver_type,
                        &lookup_class,
                        method.as_str(),
                        args.as_slice(),
                        &arg_types,
                        position,
                    ),
                    None => Type::Error,
                }
            }
            ExprKind::StaticDispatch {
                receiver,
                type_name,
                method,
                args,
            } => {
                let receiver_type = self.check_expr(receiver, env);
                let arg_types = self.check_args(args, env);

                if type_name.as_str() == SELF_TYPE || !self.table.has_class(type_name) {
                    self.error(
                        ErrorImpl::UnknownType {
                            type_: type_name.clone(),
                        },
                        position,
                    );
                    Type::Error
                } else if !self.conforms(&receiver_type, &Type::class(type_name)) {
                    self.error(
                        ErrorImpl::StaticDispatchMismatch {
                            type_: type_name.clone(),
                            receiver: receiver_type.to_string(),
                        },
                        position,
                    );
                    Type::Error
                } else if receiver_type.is_error() {
                    Type::Error
                } else {
                    let lookup_class = type_name.clone();
                    self.check_dispatch(
                        &receiver_type,
                        &lookup_class,
                        method.as_str(),
                        args.as_slice(),
                        &arg_types,
                        position,
                    )
                }
            }
            ExprKind::Arithmetic { op, left, right } => {
                let left_type = self.check_expr(left, env);
                let right_type = self.check_expr(right, env);
                self.check_operands(op.symbol(), INT, &[left_type, right_type], Type::class(INT), position)
            }
            ExprKind::Comparison {
                op: ComparisonOp::Equals,
                left,
                right,
            } => {
                let left_type = self.check_expr(left, env);
                let right_type = self.check_expr(right, env);
                self.check_equality(&left_type, &right_type, position)
            }
            ExprKind::Comparison { op, left, right } => {
                let left_type = self.check_expr(left, env);
                let right_type = self.check_expr(right, env);
                self.check_operands(op.symbol(), INT, &[left_type, right_type], Type::class(BOOL), position)
            }
            ExprKind::Complement(inner) => {
                let inner_type = self.check_expr(inner, env);
                self.check_operands("~", INT, &[inner_type], Type::class(INT), position)
            }
            ExprKind::Not(inner) => {
                let inner_type = self.check_expr(inner, env);
                self.check_operands("not", BOOL, &[inner_type], Type::class(BOOL), position)
            }
            ExprKind::Paren(inner) => self.check_expr(inner, env),
            ExprKind::If {
                predicate,
                then_branch,
                else_branch,
            } => {
                let predicate_ok = self.check_predicate("if", predicate, env);
                let then_type = self.check_expr(then_branch, env);
                let else_type = self.check_expr(else_branch, env);
                if predicate_ok {
                    self.table.join(&then_type, &else_type)
                } else {
                    Type::Error
                }
            }
            ExprKind::While { predicate, body } => {
                let predicate_ok = self.check_predicate("while", predicate, env);
                self.check_expr(body, env);
                if predicate_ok {
                    Type::Void
                } else {
                    Type::Error
                }
            }
            ExprKind::Let { binding, body } => self.check_let(binding, body, env),
            ExprKind::Case { scrutinee, arms } => self.check_case(scrutinee, arms, env, position),
        };

        self.finish(expr, static_type)
    }

    fn finish(&self, expr: &mut Expr, static_type: Type) -> Type {
        expr.static_type = Some(static_type.clone());
        static_type
    }

    fn check_args(&mut self, args: &mut [Expr], env: &Environment) -> Vec<Type> {
        args.iter_mut().map(|arg| self.check_expr(arg, env)).collect()
    }

    fn check_dispatch(
        &mut self,
        receiver_type: &Type,
        lookup_class: &str,
        method: &str,
        args: &[Expr],
        arg_types: &[Type],
        position: Position,
    ) -> Type {
        let table = self.table;
        let Some(signature) = table.lookup_method(lookup_class, method) else {
            self.error(
                ErrorImpl::UndefinedMethod {
                    class: lookup_class.to_string(),
                    method: method.to_string(),
                },
                position,
            );
            return Type::Error;
        };

        if !self.check_arguments(signature, args, arg_types, position) {
            return Type::Error;
        }

        if signature.return_type == SELF_TYPE {
            match receiver_type {
                Type::Void => Type::class(OBJECT),
                other => other.clone(),
            }
        } else {
            Type::class(&signature.return_type)
        }
    }

    fn check_arguments(
        &mut self,
        signature: &MethodSignature,
        args: &[Expr],
        arg_types: &[Type],
        position: Position,
    ) -> bool {
        if signature.arity() != args.len() {
            self.error(
                ErrorImpl::ArgumentCountMismatch {
                    method: signature.name.clone(),
                    expected: signature.arity(),
                    received: args.len(),
                },
                position,
            );
            return false;
        }

        let mut ok = true;
        for ((parameter, formal_type), (arg, found)) in
            signature.formals.iter().zip(args.iter().zip(arg_types))
        {
            let expected = self.annotation_type(formal_type);
            if !self.conforms(found, &expected) {
                self.error(
                    ErrorImpl::ArgumentTypeMatchError {
                        method: signature.name.clone(),
                        parameter: parameter.clone(),
                        expected: expected.to_string(),
                        received: found.to_string(),
                    },
                    arg.span.start,
                );
                ok = false;
            }
        }
        ok
    }

    /// Every operand must be `operand_class`; the result is `result` unless
    /// one of them is not.
    fn check_operands(
        &mut self,
        operator: &str,
        operand_class: &str,
        operands: &[Type],
        result: Type,
        position: Position,
    ) -> Type {
        let expected = Type::class(operand_class);
        if operands
            .iter()
            .all(|operand| operand.is_error() || *operand == expected)
        {
            if operands.iter().any(Type::is_error) {
                return Type::Error;
            }
            return result;
        }

        let received: Vec<String> = operands.iter().map(Type::to_string).collect();
        self.error(
            ErrorImpl::OperandTypeMatchError {
                operator: operator.to_string(),
                expected: operand_class.to_string(),
                received: received.join(" and "),
            },
            position,
        );
        Type::Error
    }

    fn check_equality(&mut self, left: &Type, right: &Type, position: Position) -> Type {
        if left.is_error() || right.is_error() {
            return Type::Error;
        }
        if (left.is_primitive() || right.is_primitive()) && left != right {
            self.error(
                ErrorImpl::InvalidEquality {
                    left: left.to_string(),
                    right: right.to_string(),
                },
                position,
            );
            return Type::Error;
        }
        Type::class(BOOL)
    }

    fn check_predicate(&mut self, construct: &str, predicate: &mut Expr, env: &Environment) -> bool {
        let found = self.check_expr(predicate, env);
        if found == Type::class(BOOL) || found.is_error() {
            return true;
        }
        self.error(
            ErrorImpl::PredicateNotBool {
                construct: construct.to_string(),
                received: found.to_string(),
            },
            predicate.span.start,
        );
        false
    }

    fn check_let(&mut self, binding: &mut LetBinding, body: &mut Expr, env: &Environment) -> Type {
        let mut ok = true;
        let declared = self.declared_type(&binding.type_name, binding.span.start);
        ok &= !declared.is_error();

        if let Some(init) = binding.init.as_mut() {
            let found = self.check_expr(init, env);
            ok &= self.expect_conforms(&found, &declared, init.span.start);
        }

        let body_env = if binding.name == "self" {
            self.error(
                ErrorImpl::IllegalSelfVariable {
                    context: String::from("a let binding"),
                },
                binding.span.start,
            );
            ok = false;
            env.clone()
        } else {
            env.push(&binding.name, declared)
        };

        let body_type = self.check_expr(body, &body_env);
        if ok {
            body_type
        } else {
            Type::Error
        }
    }

    fn check_case(
        &mut self,
        scrutinee: &mut Expr,
        arms: &mut [CaseArm],
        env: &Environment,
        position: Position,
    ) -> Type {
        let mut ok = true;
        let scrutinee_type = self.check_expr(scrutinee, env);
        if scrutinee_type == Type::Void {
            self.error(ErrorImpl::CaseOnVoid, position);
            ok = false;
        }

        let mut seen: Vec<String> = vec![];
        let mut result: Option<Type> = None;
        for arm in arms.iter_mut() {
            let arm_type = if arm.type_name == SELF_TYPE {
                self.error(ErrorImpl::SelfTypeCaseBranch, arm.span.start);
                ok = false;
                Type::Error
            } else {
                let declared = self.declared_type(&arm.type_name, arm.span.start);
                ok &= !declared.is_error();
                declared
            };

            if seen.contains(&arm.type_name) {
                self.error(
                    ErrorImpl::DuplicateCaseBranch {
                        type_: arm.type_name.clone(),
                    },
                    arm.span.start,
                );
                ok = false;
            } else {
                seen.push(arm.type_name.clone());
            }

            let arm_env = if arm.name == "self" {
                self.error(
                    ErrorImpl::IllegalSelfVariable {
                        context: String::from("a case branch"),
                    },
                    arm.span.start,
                );
                ok = false;
                env.clone()
            } else {
                env.push(&arm.name, arm_type)
            };

            let body_type = self.check_expr(&mut arm.body, &arm_env);
            result = Some(match result {
                Some(joined) => self.table.join(&joined, &body_type),
                None => body_type,
            });
        }

        match result {
            Some(joined) if ok => joined,
            _ => Type::Error,
        }
    }

    fn finish_class(self) -> Vec<Error> {
        self.errors
    }
}

/// Type checks one class of the program the table was built from.
///
/// Takes only shared references, so independent classes may be checked in
/// any order or in parallel.
pub fn check_class(table: &ClassTable, class: &Class) -> Result<(Class, Vec<Error>), StructuralError> {
    if !table.has_class(&class.name) {
        return Err(StructuralError::ForeignClass {
            class: class.name.clone(),
        });
    }

    let mut typed = class.clone();
    let mut checker = TypeChecker::new(table, &class.name);
    let env = checker.class_environment();

    for feature in typed.features.iter_mut() {
        match feature {
            Feature::Attribute(attribute) => {
                let env = env.push("self", checker.self_type());
                checker.check_attribute(attribute, &env);
            }
            Feature::Method(method) => checker.check_method(method, &env),
        }
    }

    let errors = checker.finish_class();
    trace!("checked class {} with {} errors", class.name, errors.len());
    Ok((typed, errors))
}

/// Type checks every class of `program` that made it into `table`.
///
/// Classes the hierarchy builder rejected (reserved names, repeated
/// declarations, inheritance cycles) are skipped; their problems were
/// already reported. Errors are returned in program order.
#[instrument(skip_all)]
pub fn check(table: &ClassTable, program: &Program) -> Result<(TypedProgram, Vec<Error>), StructuralError> {
    if program.classes.is_empty() {
        return Err(StructuralError::EmptyProgram);
    }

    let mut typed_program = TypedProgram::default();
    let mut errors = vec![];

    for (index, class) in program.classes.iter().enumerate() {
        if table.is_excluded(&class.name) {
            continue;
        }

        match table.get_class(&class.name) {
            Some(record) if record.declaration == Some(index) => {
                let (typed, class_errors) = check_class(table, class)?;
                typed_program.classes.push(typed);
                errors.extend(class_errors);
            }
            Some(_) => continue,
            None => {
                return Err(StructuralError::ForeignClass {
                    class: class.name.clone(),
                })
            }
        }
    }

    debug!(
        "checked {} classes, {} errors",
        typed_program.classes.len(),
        errors.len()
    );
    Ok((typed_program, errors))
}
