use super::*;

/// Checks `program` against `env`, leaving its top-level declarations in
/// the environment, and returns the typed tree.
pub fn typecheck(program: &Program, env: &mut TypeEnvironment) -> TypeResult<TypedProgram> {
    Checker::new(env).check_program(program)
}

pub struct Checker<'env> {
    env: &'env mut TypeEnvironment,
}

impl<'env> Checker<'env> {
    pub fn new(env: &'env mut TypeEnvironment) -> Self {
        Self { env }
    }

    pub fn check_program(&mut self, program: &Program) -> TypeResult<TypedProgram> {
        let statements = self.check_statements(&program.statements)?;
        let ty = match statements.last() {
            Some(TypedStatement {
                kind: TypedStatementKind::Expr(expr),
                ..
            }) => expr.ty.clone(),
            _ => Type::Block,
        };
        Ok(TypedProgram {
            statements,
            ty,
            span: program.span,
        })
    }

    fn scoped<T>(
        &mut self,
        function: Option<FunctionScope>,
        check: impl FnOnce(&mut Self) -> TypeResult<T>,
    ) -> TypeResult<T> {
        match function {
            Some(function) => self.env.push_function_scope(function),
            None => self.env.push_scope(),
        }
        let result = check(self);
        self.env.pop_scope();
        result
    }

    fn check_statements(&mut self, statements: &[Statement]) -> TypeResult<Vec<TypedStatement>> {
        statements
            .iter()
            .map(|statement| self.check_statement(statement))
            .collect()
    }

    fn check_block(&mut self, block: &Block) -> TypeResult<TypedBlock> {
        self.scoped(None, |checker| checker.check_block_in_scope(block))
    }

    fn check_block_in_scope(&mut self, block: &Block) -> TypeResult<TypedBlock> {
        Ok(TypedBlock {
            statements: self.check_statements(&block.statements)?,
            span: block.span,
        })
    }

    fn check_statement(&mut self, statement: &Statement) -> TypeResult<TypedStatement> {
        let span = statement.span;
        let kind = match &statement.node {
            StatementKind::Let { name, value } => {
                let value = self.check_expr(value)?;
                self.env.define_var(name.clone(), value.ty.clone(), span);
                TypedStatementKind::Let {
                    name: name.clone(),
                    value,
                }
            }
            StatementKind::Assign { name, value } => {
                let binding = self.env.get_var(name).cloned().ok_or_else(|| {
                    CompilerError::UndeclaredVariable {
                        name: name.clone(),
                        span,
                    }
                })?;
                let value = self.check_expr(value)?;
                expect_type(&binding.ty, &value, Some(binding.span))?;
                TypedStatementKind::Assign {
                    name: name.clone(),
                    value,
                }
            }
            StatementKind::IndexAssign {
                target,
                index,
                value,
            } => {
                let target = self.check_expr(target)?;
                let element = array_element(&target)?;
                let index = self.check_expr(index)?;
                expect_exact(&Type::Int, &index)?;
                let value = self.check_expr(value)?;
                if value.ty != element {
                    return Err(CompilerError::ArrayIndexAssignmentTypeMismatch {
                        expected: element,
                        found: value.ty,
                        span: value.span,
                        expected_span: target.span,
                    });
                }
                TypedStatementKind::IndexAssign {
                    target,
                    index,
                    value,
                }
            }
            StatementKind::MemberAssign {
                target,
                member,
                member_span,
                value,
            } => {
                let target = self.check_expr(target)?;
                let def = struct_of(&target)?;
                let member_ty = member_type(&def, member, *member_span)?;
                let value = self.check_expr(value)?;
                expect_type(&member_ty, &value, Some(def.span))?;
                TypedStatementKind::MemberAssign {
                    target,
                    member: member.clone(),
                    value,
                }
            }
            StatementKind::Print(expr) => TypedStatementKind::Print(self.check_expr(expr)?),
            StatementKind::If {
                branches,
                otherwise,
            } => {
                let mut checked = Vec::with_capacity(branches.len());
                for branch in branches {
                    let condition = self.check_expr(&branch.condition)?;
                    expect_exact(&Type::Bool, &condition)?;
                    let body = self.check_block(&branch.body)?;
                    checked.push(TypedIfBranch { condition, body });
                }
                let otherwise = match otherwise {
                    Some(block) => Some(self.check_block(block)?),
                    None => None,
                };
                TypedStatementKind::If {
                    branches: checked,
                    otherwise,
                }
            }
            StatementKind::While { condition, body } => {
                let condition = self.check_expr(condition)?;
                expect_exact(&Type::Bool, &condition)?;
                let body = self.check_block(body)?;
                TypedStatementKind::While { condition, body }
            }
            StatementKind::For {
                binding,
                iterable,
                body,
            } => {
                let iterable = self.check_expr(iterable)?;
                let element = match &iterable.ty {
                    Type::Array(element) => (**element).clone(),
                    Type::String => Type::String,
                    other => {
                        return Err(CompilerError::UnexpectedType {
                            expected: vec![Type::UntypedArray, Type::String],
                            found: other.clone(),
                            span: iterable.span,
                        })
                    }
                };
                let body = self.scoped(None, |checker| {
                    checker.env.define_var(binding.clone(), element, span);
                    checker.check_block_in_scope(body)
                })?;
                TypedStatementKind::For {
                    binding: binding.clone(),
                    iterable,
                    body,
                }
            }
            StatementKind::ForRange {
                binding,
                start,
                end,
                body,
            } => {
                let start = self.check_expr(start)?;
                expect_exact(&Type::Int, &start)?;
                let end = self.check_expr(end)?;
                expect_exact(&Type::Int, &end)?;
                let body = self.scoped(None, |checker| {
                    checker.env.define_var(binding.clone(), Type::Int, span);
                    checker.check_block_in_scope(body)
                })?;
                TypedStatementKind::ForRange {
                    binding: binding.clone(),
                    start,
                    end,
                    body,
                }
            }
            StatementKind::Struct(decl) => {
                TypedStatementKind::Struct(self.declare_struct(decl, span)?)
            }
            StatementKind::Enum(decl) => TypedStatementKind::Enum(self.declare_enum(decl, span)?),
            StatementKind::Function(decl) => {
                TypedStatementKind::Function(self.declare_function(decl, span)?)
            }
            StatementKind::Return(value) => {
                let function = self
                    .env
                    .function_scope()
                    .cloned()
                    .ok_or(CompilerError::ReturnOutsideFunction { span })?;
                let value = self.check_expr(value)?;
                expect_type(&function.return_type, &value, Some(function.return_span))?;
                TypedStatementKind::Return(value)
            }
            StatementKind::Match { scrutinee, arms } => self.check_match(scrutinee, arms, span)?,
            StatementKind::Expr(expr) => {
                let expr = self.check_expr(expr)?;
                let ty = expr.ty.clone();
                return Ok(TypedStatement {
                    kind: TypedStatementKind::Expr(expr),
                    ty,
                    span,
                });
            }
        };
        Ok(TypedStatement {
            kind,
            ty: Type::Block,
            span,
        })
    }

    fn ensure_type_name_free(&self, name: &str, span: Span) -> TypeResult<()> {
        match self.env.get_type(name) {
            Some(existing) => Err(CompilerError::TypeRedefinition {
                name: name.to_string(),
                span,
                previous_span: existing.span,
            }),
            None => Ok(()),
        }
    }

    fn declare_struct(&mut self, decl: &StructDecl, span: Span) -> TypeResult<Arc<StructType>> {
        self.ensure_type_name_free(&decl.name, span)?;
        let mut members = IndexMap::new();
        let mut seen: HashMap<&str, Span> = HashMap::new();
        for member in &decl.members {
            if let Some(previous) = seen.insert(&member.name, member.span) {
                return Err(CompilerError::DuplicatedAttribute {
                    name: member.name.clone(),
                    span: member.span,
                    previous_span: previous,
                });
            }
            members.insert(member.name.clone(), self.resolve_annotation(&member.ty)?);
        }
        let def = Arc::new(StructType {
            name: decl.name.clone(),
            members,
            span,
        });
        self.env
            .define_type(decl.name.clone(), Type::Struct(def.clone()), Some(span));
        Ok(def)
    }

    fn declare_enum(&mut self, decl: &EnumDecl, span: Span) -> TypeResult<Arc<EnumType>> {
        self.ensure_type_name_free(&decl.name, span)?;
        let mut variants = Vec::with_capacity(decl.variants.len());
        let mut seen: HashMap<&str, Span> = HashMap::new();
        for variant in &decl.variants {
            if let Some(previous) = seen.insert(&variant.name, variant.span) {
                return Err(CompilerError::DuplicatedAttribute {
                    name: variant.name.clone(),
                    span: variant.span,
                    previous_span: previous,
                });
            }
            variants.push(match &variant.payload {
                Some(payload) => {
                    EnumVariant::Tuple(variant.name.clone(), self.resolve_annotation(payload)?)
                }
                None => EnumVariant::Simple(variant.name.clone()),
            });
        }
        let def = Arc::new(EnumType {
            name: decl.name.clone(),
            variants,
            span,
        });
        self.env
            .define_type(decl.name.clone(), Type::Enum(def.clone()), Some(span));
        Ok(def)
    }

    fn declare_function(&mut self, decl: &FunctionDecl, span: Span) -> TypeResult<Rc<TypedFunction>> {
        let mut params = Vec::with_capacity(decl.params.len());
        let mut seen: HashMap<&str, Span> = HashMap::new();
        for param in &decl.params {
            if let Some(previous) = seen.insert(&param.name, param.span) {
                return Err(CompilerError::DuplicatedAttribute {
                    name: param.name.clone(),
                    span: param.span,
                    previous_span: previous,
                });
            }
            params.push(self.resolve_annotation(&param.ty)?);
        }
        let return_type = self.resolve_annotation(&decl.return_type)?;
        let signature = Arc::new(FunctionType {
            name: decl.name.clone(),
            params,
            return_type: return_type.clone(),
            definition: Some(span),
        });
        let function_scope = FunctionScope {
            name: decl.name.clone(),
            return_type,
            return_span: decl.return_type.span,
        };

        let body = self.scoped(Some(function_scope), |checker| {
            checker
                .env
                .define_var(decl.name.clone(), Type::Function(signature.clone()), span);
            for (param, ty) in decl.params.iter().zip(&signature.params) {
                checker.env.define_var(param.name.clone(), ty.clone(), param.span);
            }
            checker.check_block_in_scope(&decl.body)
        })?;

        self.env
            .define_var(decl.name.clone(), Type::Function(signature.clone()), span);
        Ok(Rc::new(TypedFunction {
            name: decl.name.clone(),
            params: decl.params.iter().map(|param| param.name.clone()).collect(),
            ty: signature,
            body,
            span,
        }))
    }

    fn check_match(
        &mut self,
        scrutinee: &Expr,
        arms: &[MatchArm],
        span: Span,
    ) -> TypeResult<TypedStatementKind> {
        let scrutinee = self.check_expr(scrutinee)?;
        let mut matcher = Matcher::for_scrutinee(&scrutinee.ty, scrutinee.span)?;
        let mut checked = Vec::with_capacity(arms.len());
        for arm in arms {
            let pattern = self.check_pattern(&arm.pattern)?;
            if !scrutinee.ty.accepts_pattern(&pattern.ty) {
                return Err(CompilerError::TypeMismatch {
                    expected: scrutinee.ty.clone(),
                    found: pattern.ty,
                    span: pattern.span,
                    expected_span: Some(scrutinee.span),
                });
            }
            matcher.add_case(&pattern)?;
            let body = self.check_block(&arm.body)?;
            checked.push(TypedMatchArm {
                pattern,
                body,
                span: arm.span,
            });
        }

        let remaining_values = matcher.remaining();
        if !remaining_values.is_empty() {
            return Err(CompilerError::InexhaustiveMatch {
                span,
                expected_type: scrutinee.ty.clone(),
                scrutinee_span: scrutinee.span,
                remaining_values,
            });
        }
        Ok(TypedStatementKind::Match {
            scrutinee,
            arms: checked,
        })
    }

    fn check_pattern(&mut self, pattern: &Pattern) -> TypeResult<TypedPattern> {
        let span = pattern.span;
        let (kind, ty) = match &pattern.node {
            PatternKind::Bool(value) => (TypedPatternKind::Bool(*value), Type::Bool),
            PatternKind::Wildcard => (TypedPatternKind::Wildcard, Type::Placeholder),
            PatternKind::Array(items) => {
                let ty = if items
                    .iter()
                    .any(|item| matches!(item, ArrayPatternItem::Int(_)))
                {
                    Type::array(Type::Int)
                } else {
                    Type::UntypedArray
                };
                (TypedPatternKind::Array(items.clone()), ty)
            }
            PatternKind::Enum {
                enum_name,
                variant,
                payload,
            } => {
                let def = self.lookup_enum(enum_name, variant, span)?;
                let declared = declared_variant(&def, variant, payload.is_some(), span)?;
                let payload = match (declared.payload(), payload) {
                    (Some(inner_type), Some(inner)) => {
                        let inner = self.check_pattern(inner)?;
                        if !inner_type.accepts_pattern(&inner.ty) {
                            return Err(CompilerError::TypeMismatch {
                                expected: inner_type.clone(),
                                found: inner.ty,
                                span: inner.span,
                                expected_span: Some(def.span),
                            });
                        }
                        Some(Box::new(inner))
                    }
                    _ => None,
                };
                let ty = Type::Enum(def.clone());
                (
                    TypedPatternKind::Enum {
                        enum_type: def,
                        variant: variant.clone(),
                        payload,
                    },
                    ty,
                )
            }
        };
        Ok(TypedPattern { kind, ty, span })
    }

    fn check_expr(&mut self, expr: &Expr) -> TypeResult<TypedExpr> {
        let span = expr.span;
        let (kind, ty) = match &expr.node {
            ExprKind::Bool(value) => (TypedExprKind::Bool(*value), Type::Bool),
            ExprKind::Int(value) => (TypedExprKind::Int(*value), Type::Int),
            ExprKind::String(value) => (TypedExprKind::String(value.clone()), Type::String),
            ExprKind::Variable(name) => {
                let binding =
                    self.env
                        .get_var(name)
                        .ok_or_else(|| CompilerError::UnknownVariable {
                            name: name.clone(),
                            span,
                        })?;
                (TypedExprKind::Variable(name.clone()), binding.ty.clone())
            }
            ExprKind::Binary {
                op,
                op_span,
                left,
                right,
            } => {
                let left = self.check_expr(left)?;
                let right = self.check_expr(right)?;
                let ty = binary_result(*op, &left.ty, &right.ty).ok_or_else(|| {
                    CompilerError::InvalidOperation {
                        operator: OperatorSpan {
                            symbol: op.symbol().to_string(),
                            span: *op_span,
                        },
                        operands: vec![operand(&left), operand(&right)],
                        span,
                    }
                })?;
                (
                    TypedExprKind::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    ty,
                )
            }
            ExprKind::Unary {
                op,
                op_span,
                operand: inner,
            } => {
                let inner = self.check_expr(inner)?;
                let ty = match (op, &inner.ty) {
                    (UnaryOp::Plus | UnaryOp::Minus, Type::Int) => Type::Int,
                    (UnaryOp::Not, Type::Bool) => Type::Bool,
                    _ => {
                        return Err(CompilerError::InvalidOperation {
                            operator: OperatorSpan {
                                symbol: op.symbol().to_string(),
                                span: *op_span,
                            },
                            operands: vec![operand(&inner)],
                            span,
                        })
                    }
                };
                (
                    TypedExprKind::Unary {
                        op: *op,
                        operand: Box::new(inner),
                    },
                    ty,
                )
            }
            ExprKind::Array {
                elements,
                annotation,
            } => self.check_array(elements, annotation.as_ref(), span)?,
            ExprKind::Index { target, index } => {
                let target = self.check_expr(target)?;
                let element = array_element(&target)?;
                let index = self.check_expr(index)?;
                expect_exact(&Type::Int, &index)?;
                (
                    TypedExprKind::Index {
                        target: Box::new(target),
                        index: Box::new(index),
                    },
                    element,
                )
            }
            ExprKind::Call {
                callee,
                callee_span,
                args,
            } => self.check_call(callee, *callee_span, args, span)?,
            ExprKind::Member {
                target,
                member,
                member_span,
            } => {
                let target = self.check_expr(target)?;
                let def = struct_of(&target)?;
                let ty = member_type(&def, member, *member_span)?;
                (
                    TypedExprKind::Member {
                        target: Box::new(target),
                        member: member.clone(),
                    },
                    ty,
                )
            }
            ExprKind::EnumLiteral {
                enum_name,
                variant,
                payload,
            } => {
                let def = self.lookup_enum(enum_name, variant, span)?;
                let declared = declared_variant(&def, variant, payload.is_some(), span)?;
                let payload = match (declared.payload(), payload) {
                    (Some(inner_type), Some(inner)) => {
                        let inner = self.check_expr(inner)?;
                        expect_type(inner_type, &inner, Some(def.span))?;
                        Some(Box::new(inner))
                    }
                    _ => None,
                };
                let ty = Type::Enum(def.clone());
                (
                    TypedExprKind::EnumLiteral {
                        enum_type: def,
                        variant: variant.clone(),
                        payload,
                    },
                    ty,
                )
            }
        };
        Ok(TypedExpr { kind, ty, span })
    }

    fn check_array(
        &mut self,
        elements: &[Expr],
        annotation: Option<&TypeAnnotation>,
        span: Span,
    ) -> TypeResult<(TypedExprKind, Type)> {
        let declared = match annotation {
            Some(annotation) => Some(self.resolve_annotation(annotation)?),
            None => None,
        };
        let checked = elements
            .iter()
            .map(|element| self.check_expr(element))
            .collect::<TypeResult<Vec<_>>>()?;

        let inferred = match checked.split_first() {
            Some((first, rest)) => {
                if let Some(odd) = rest.iter().find(|element| element.ty != first.ty) {
                    return Err(CompilerError::ArrayTypeMismatch {
                        expected: first.ty.clone(),
                        found: odd.ty.clone(),
                        span: odd.span,
                        expected_span: first.span,
                    });
                }
                Some(first.ty.clone())
            }
            None => None,
        };

        let element = match (declared, inferred) {
            (None, None) => return Err(CompilerError::EmptyArrayWithoutTypeAnnotation { span }),
            (Some(declared), None) => declared,
            (None, Some(inferred)) => inferred,
            (Some(declared), Some(inferred)) if declared == inferred => declared,
            (Some(declared), Some(inferred)) => {
                let elements_span = match (checked.first(), checked.last()) {
                    (Some(first), Some(last)) => first.span.merge(&last.span),
                    _ => span,
                };
                return Err(CompilerError::ArrayTypeMismatch {
                    expected: declared,
                    found: inferred,
                    span: elements_span,
                    expected_span: annotation.map(|annotation| annotation.span).unwrap_or(span),
                });
            }
        };
        Ok((TypedExprKind::Array(checked), Type::array(element)))
    }

    fn check_call(
        &mut self,
        callee: &str,
        callee_span: Span,
        args: &CallArgs,
        span: Span,
    ) -> TypeResult<(TypedExprKind, Type)> {
        if let Some(binding) = self.env.get_var(callee) {
            return match binding.ty.clone() {
                Type::Function(signature) => {
                    self.check_function_call(callee, &signature, args, span)
                }
                other => Err(CompilerError::NotCallable {
                    name: callee.to_string(),
                    found: other,
                    span: callee_span,
                }),
            };
        }
        match self.env.get_type(callee).map(|binding| binding.ty.clone()) {
            Some(Type::Struct(def)) => self.check_struct_init(def, args, span),
            Some(other) => Err(CompilerError::NotCallable {
                name: callee.to_string(),
                found: other,
                span: callee_span,
            }),
            None => Err(CompilerError::UnknownVariable {
                name: callee.to_string(),
                span: callee_span,
            }),
        }
    }

    /// `callee` is the name as written at the call site; it may be an alias
    /// of the declared function.
    fn check_function_call(
        &mut self,
        callee: &str,
        signature: &FunctionType,
        args: &CallArgs,
        span: Span,
    ) -> TypeResult<(TypedExprKind, Type)> {
        let args: &[Expr] = match args {
            CallArgs::Positional(args) => args.as_slice(),
            CallArgs::Named(named) if named.is_empty() => &[],
            CallArgs::Named(_) => {
                return Err(CompilerError::ArgumentStyleMismatch {
                    name: signature.name.clone(),
                    expects_named: false,
                    span,
                })
            }
        };
        if args.len() != signature.params.len() {
            return Err(CompilerError::ArityMismatch {
                name: signature.name.clone(),
                expected: signature.params.len(),
                found: args.len(),
                span,
            });
        }
        let mut checked = Vec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(&signature.params) {
            let arg = self.check_expr(arg)?;
            expect_type(param, &arg, signature.definition)?;
            checked.push(arg);
        }
        Ok((
            TypedExprKind::Call {
                callee: callee.to_string(),
                args: checked,
            },
            signature.return_type.clone(),
        ))
    }

    fn check_struct_init(
        &mut self,
        def: Arc<StructType>,
        args: &CallArgs,
        span: Span,
    ) -> TypeResult<(TypedExprKind, Type)> {
        let named: &[NamedArg] = match args {
            CallArgs::Named(named) => named.as_slice(),
            CallArgs::Positional(positional) if positional.is_empty() => &[],
            CallArgs::Positional(_) => {
                return Err(CompilerError::ArgumentStyleMismatch {
                    name: def.name.clone(),
                    expects_named: true,
                    span,
                })
            }
        };
        let mut seen: HashMap<&str, Span> = HashMap::new();
        let mut members = Vec::with_capacity(named.len());
        for arg in named {
            if let Some(previous) = seen.insert(&arg.name, arg.span) {
                return Err(CompilerError::DuplicatedAttribute {
                    name: arg.name.clone(),
                    span: arg.span,
                    previous_span: previous,
                });
            }
            let expected = member_type(&def, &arg.name, arg.span)?;
            let value = self.check_expr(&arg.value)?;
            expect_type(&expected, &value, Some(def.span))?;
            members.push((arg.name.clone(), value));
        }
        if let Some(missing) = def.members.keys().find(|name| !seen.contains_key(name.as_str())) {
            return Err(CompilerError::MissingMember {
                type_name: def.name.clone(),
                member: missing.clone(),
                span,
            });
        }
        let ty = Type::Struct(def.clone());
        Ok((
            TypedExprKind::StructInit {
                struct_type: def,
                members,
            },
            ty,
        ))
    }

    fn lookup_enum(&self, enum_name: &str, variant: &str, span: Span) -> TypeResult<Arc<EnumType>> {
        match self.env.get_type(enum_name).map(|binding| &binding.ty) {
            Some(Type::Enum(def)) => Ok(def.clone()),
            Some(_) => Err(CompilerError::UnknownVariant {
                enum_name: enum_name.to_string(),
                variant: variant.to_string(),
                span,
            }),
            None => Err(CompilerError::UnknownType {
                name: enum_name.to_string(),
                span,
            }),
        }
    }

    fn resolve_annotation(&self, annotation: &TypeAnnotation) -> TypeResult<Type> {
        let unknown = || CompilerError::UnknownType {
            name: annotation.to_string(),
            span: annotation.span,
        };
        match (annotation.name.as_str(), &annotation.generic) {
            ("array", Some(inner)) => Ok(Type::array(self.resolve_annotation(inner)?)),
            (_, Some(_)) | ("array", None) => Err(unknown()),
            (name, None) => self
                .env
                .get_type(name)
                .map(|binding| binding.ty.clone())
                .ok_or_else(unknown),
        }
    }
}

fn binary_result(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    match (op, left, right) {
        (BinaryOp::Add, Type::String, Type::String) => Some(Type::String),
        (
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod,
            Type::Int,
            Type::Int,
        ) => Some(Type::Int),
        (BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Ge, Type::Int, Type::Int) => {
            Some(Type::Bool)
        }
        (BinaryOp::Eq | BinaryOp::Ne, left, right) if left == right => Some(Type::Bool),
        (BinaryOp::And | BinaryOp::Or, Type::Bool, Type::Bool) => Some(Type::Bool),
        _ => None,
    }
}

fn operand(expr: &TypedExpr) -> OperandSpan {
    OperandSpan {
        ty: expr.ty.clone(),
        span: expr.span,
    }
}

/// Checks a value against a type fixed elsewhere in the program.
fn expect_type(expected: &Type, found: &TypedExpr, expected_span: Option<Span>) -> TypeResult<()> {
    if *expected == found.ty {
        Ok(())
    } else {
        Err(CompilerError::TypeMismatch {
            expected: expected.clone(),
            found: found.ty.clone(),
            span: found.span,
            expected_span,
        })
    }
}

/// Checks a value against a type the language itself requires.
fn expect_exact(expected: &Type, found: &TypedExpr) -> TypeResult<()> {
    if *expected == found.ty {
        Ok(())
    } else {
        Err(CompilerError::UnexpectedType {
            expected: vec![expected.clone()],
            found: found.ty.clone(),
            span: found.span,
        })
    }
}

fn array_element(target: &TypedExpr) -> TypeResult<Type> {
    target
        .ty
        .element()
        .cloned()
        .ok_or_else(|| CompilerError::IndexingNonArray {
            found: target.ty.clone(),
            span: target.span,
        })
}

fn struct_of(target: &TypedExpr) -> TypeResult<Arc<StructType>> {
    match &target.ty {
        Type::Struct(def) => Ok(def.clone()),
        other => Err(CompilerError::NotAStruct {
            found: other.clone(),
            span: target.span,
        }),
    }
}

fn member_type(def: &StructType, member: &str, span: Span) -> TypeResult<Type> {
    def.members
        .get(member)
        .cloned()
        .ok_or_else(|| CompilerError::UnknownMember {
            type_name: def.name.clone(),
            member: member.to_string(),
            span,
        })
}

fn declared_variant<'def>(
    def: &'def EnumType,
    variant: &str,
    has_payload: bool,
    span: Span,
) -> TypeResult<&'def EnumVariant> {
    let declared = def
        .variant(variant)
        .ok_or_else(|| CompilerError::UnknownVariant {
            enum_name: def.name.clone(),
            variant: variant.to_string(),
            span,
        })?;
    let expects_payload = declared.payload().is_some();
    if expects_payload != has_payload {
        return Err(CompilerError::VariantPayloadMismatch {
            enum_name: def.name.clone(),
            variant: variant.to_string(),
            expects_payload,
            span,
        });
    }
    Ok(declared)
}
