//! Portable tree to predicate tree.
//!
//! Types and members are resolved through the catalog, scoped to the module
//! of the declaring type. Parameters are shared by name for the whole
//! session, so every reference to the free variable is the same [`Param`].

use std::collections::HashMap;
use std::sync::Arc;

use courier_core::{
    Expr, ExprKind, Lambda, Member, MemberKind, NodeCategory, NodeType, Param, SymbolCatalog,
    SymbolDescriptor, Type, TypeDescriptor, Value,
};
use courier_wire::{
    ConstructorRef, FORMAT_VERSION, MemberRef, MethodRef, NodeBody, PortableNode, PortableTree,
};

use crate::constant;
use crate::error::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

/// Decode a predicate over `declaring`.
pub fn decode(
    tree: &PortableTree,
    declaring: &Type,
    catalog: &dyn SymbolCatalog,
) -> Result<Lambda> {
    Decoder::new(catalog, declaring).decode(tree)
}

/// Per-call decoder state: type cache and parameter session map.
pub struct Decoder<'c> {
    catalog: &'c dyn SymbolCatalog,
    declaring: Type,
    types: HashMap<TypeDescriptor, Type>,
    params: HashMap<String, Param>,
}

impl<'c> Decoder<'c> {
    pub fn new(catalog: &'c dyn SymbolCatalog, declaring: &Type) -> Self {
        Self {
            catalog,
            declaring: declaring.clone(),
            types: HashMap::new(),
            params: HashMap::new(),
        }
    }

    #[tracing::instrument(skip_all, fields(declaring = %self.declaring))]
    pub fn decode(mut self, tree: &PortableTree) -> Result<Lambda> {
        if tree.version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion(tree.version));
        }
        let NodeBody::Lambda { .. } = &tree.root.body else {
            return Err(DecodeError::InvalidShape(format!(
                "root is a `{}` node, expected `lambda`",
                tree.root.kind_name()
            )));
        };
        let lambda = self.lambda(&tree.root)?;

        if !lambda.is_predicate() {
            return Err(DecodeError::InvalidShape(
                "expected one parameter and a Boolean body".into(),
            ));
        }
        let param_ty = lambda.parameters[0].ty();
        if param_ty.descriptor() != self.declaring.descriptor() {
            return Err(DecodeError::InvalidShape(format!(
                "parameter is `{param_ty}`, expected `{}`",
                self.declaring
            )));
        }
        tracing::debug!(types = self.types.len(), "predicate decoded");
        Ok(lambda)
    }

    fn expr(&mut self, node: &PortableNode) -> Result<Expr> {
        let kind = node.kind_name();
        let category = category_of(&node.body).ok_or_else(|| unknown_kind(node))?;
        if node.node_type.category() != category {
            return Err(DecodeError::tag_mismatch(node.node_type, kind));
        }
        let ty = self.resolve_type(&node.ty)?;

        let expr_kind = match &node.body {
            NodeBody::BinaryOp {
                left,
                right,
                operator,
                method,
                conversion,
                lift_to_null,
            } => {
                self.check_operator(node, *operator)?;
                ExprKind::Binary {
                    left: Box::new(self.expr(left)?),
                    right: Box::new(self.expr(right)?),
                    method: self.opt_method(method.as_ref())?,
                    conversion: match conversion {
                        Some(c) => Some(Arc::new(self.lambda(c)?)),
                        None => None,
                    },
                    lift_to_null: *lift_to_null,
                }
            }
            NodeBody::UnaryOp {
                operand,
                operator,
                method,
            } => {
                self.check_operator(node, *operator)?;
                ExprKind::Unary {
                    operand: Box::new(self.expr(operand)?),
                    method: self.opt_method(method.as_ref())?,
                }
            }
            NodeBody::Conditional {
                test,
                if_true,
                if_false,
            } => ExprKind::Conditional {
                test: Box::new(self.expr(test)?),
                if_true: Box::new(self.expr(if_true)?),
                if_false: Box::new(self.expr(if_false)?),
            },
            NodeBody::Constant { value } => {
                let value = match value {
                    Some(v) => {
                        let value_ty = self.resolve_type(&v.ty)?;
                        constant::from_json(&v.value, &value_ty, self.catalog)?
                    }
                    None => Value::Null,
                };
                ExprKind::Constant(value)
            }
            NodeBody::Default {} => ExprKind::Default,
            NodeBody::Index {
                object,
                indexer,
                arguments,
            } => ExprKind::Index {
                object: Box::new(self.expr(object)?),
                indexer: match indexer {
                    Some(m) => Some(self.member(m)?),
                    None => None,
                },
                arguments: self.exprs(arguments)?,
            },
            NodeBody::Invocation {
                expression,
                arguments,
            } => ExprKind::Invocation {
                expression: Box::new(self.expr(expression)?),
                arguments: self.exprs(arguments)?,
            },
            NodeBody::Lambda { .. } => ExprKind::Lambda(Arc::new(self.lambda(node)?)),
            NodeBody::MemberAccess { expression, member } => ExprKind::MemberAccess {
                expression: match expression {
                    Some(e) => Some(Box::new(self.expr(e)?)),
                    None => None,
                },
                member: self.member(member)?,
            },
            NodeBody::MethodCall {
                object,
                method,
                arguments,
            } => ExprKind::MethodCall {
                object: match object {
                    Some(o) => Some(Box::new(self.expr(o)?)),
                    None => None,
                },
                method: self.method(method)?,
                arguments: self.exprs(arguments)?,
            },
            NodeBody::NewArray {
                element_type,
                expressions,
            } => ExprKind::NewArray {
                element_type: self.resolve_type(element_type)?,
                expressions: self.exprs(expressions)?,
            },
            NodeBody::NewObject {
                constructor,
                arguments,
                members,
            } => ExprKind::NewObject {
                constructor: self.constructor(constructor)?,
                arguments: self.exprs(arguments)?,
                members: members
                    .iter()
                    .map(|m| self.member(m))
                    .collect::<Result<_>>()?,
            },
            NodeBody::Parameter { .. } => ExprKind::Parameter(self.parameter(node)?),
            NodeBody::RuntimeVariablesGroup { variables } => {
                ExprKind::RuntimeVariables(self.parameters(variables)?)
            }
            NodeBody::TypeTest {
                expression,
                type_operand,
                test_kind,
            } => {
                self.check_operator(node, *test_kind)?;
                ExprKind::TypeTest {
                    expression: Box::new(self.expr(expression)?),
                    type_operand: self.resolve_type(type_operand)?,
                }
            }
            NodeBody::Block {
                expressions,
                variables,
            } => {
                let variables = self.parameters(variables)?;
                ExprKind::Block {
                    variables,
                    expressions: self.exprs(expressions)?,
                }
            }
            NodeBody::Unknown => return Err(unknown_kind(node)),
        };

        Ok(Expr::new(node.node_type, ty, expr_kind))
    }

    fn exprs(&mut self, nodes: &[PortableNode]) -> Result<Vec<Expr>> {
        nodes.iter().map(|n| self.expr(n)).collect()
    }

    fn lambda(&mut self, node: &PortableNode) -> Result<Lambda> {
        let NodeBody::Lambda {
            name,
            parameters,
            body,
            tail_call,
        } = &node.body
        else {
            return Err(DecodeError::InvalidShape(format!(
                "expected a `lambda` node, found `{}`",
                node.kind_name()
            )));
        };
        if node.node_type != NodeType::Lambda {
            return Err(DecodeError::tag_mismatch(node.node_type, node.kind_name()));
        }
        let ty = self.resolve_type(&node.ty)?;
        let parameters = self.parameters(parameters)?;
        let body = self.expr(body)?;
        Ok(Lambda {
            name: name.clone(),
            parameters,
            body,
            tail_call: *tail_call,
            ty,
        })
    }

    fn parameters(&mut self, nodes: &[PortableNode]) -> Result<Vec<Param>> {
        nodes.iter().map(|n| self.parameter(n)).collect()
    }

    /// First reference to a name mints the parameter; later ones share it.
    fn parameter(&mut self, node: &PortableNode) -> Result<Param> {
        let NodeBody::Parameter { name } = &node.body else {
            return Err(DecodeError::InvalidShape(format!(
                "expected a `parameter` node, found `{}`",
                node.kind_name()
            )));
        };
        let Some(name) = name else {
            return Err(DecodeError::InvalidShape("parameter without a name".into()));
        };
        if let Some(param) = self.params.get(name) {
            return Ok(param.clone());
        }
        let ty = self.resolve_type(&node.ty)?;
        let param = Param::new(name.clone(), ty);
        self.params.insert(name.clone(), param.clone());
        Ok(param)
    }

    fn check_operator(&self, node: &PortableNode, operator: NodeType) -> Result<()> {
        if operator != node.node_type {
            return Err(DecodeError::UnsupportedConstruct(format!(
                "operator {operator} disagrees with nodeType {}",
                node.node_type
            )));
        }
        Ok(())
    }

    fn resolve_type(&mut self, desc: &TypeDescriptor) -> Result<Type> {
        if let Some(ty) = self.types.get(desc) {
            return Ok(ty.clone());
        }
        let ty = self
            .catalog
            .resolve_type(desc, Some(self.declaring.module()))?;
        self.types.insert(desc.clone(), ty.clone());
        Ok(ty)
    }

    fn resolve_symbol(&self, desc: SymbolDescriptor) -> Result<Member> {
        Ok(self
            .catalog
            .resolve_symbol(&desc, Some(self.declaring.module()))?)
    }

    fn member(&self, member: &MemberRef) -> Result<Member> {
        self.resolve_symbol(SymbolDescriptor::new(
            member.owner.clone(),
            member.member_kind,
            &member.name,
            &member.signature,
        ))
    }

    fn method(&self, method: &MethodRef) -> Result<Member> {
        self.resolve_symbol(
            SymbolDescriptor::new(
                method.owner.clone(),
                MemberKind::Method,
                &method.name,
                &method.signature,
            )
            .with_generic_arguments(method.generic.clone()),
        )
    }

    fn opt_method(&self, method: Option<&MethodRef>) -> Result<Option<Member>> {
        method.map(|m| self.method(m)).transpose()
    }

    fn constructor(&self, constructor: &ConstructorRef) -> Result<Member> {
        self.resolve_symbol(SymbolDescriptor::new(
            constructor.owner.clone(),
            MemberKind::Constructor,
            &constructor.name,
            &constructor.signature,
        ))
    }
}

fn unknown_kind(node: &PortableNode) -> DecodeError {
    DecodeError::UnsupportedConstruct(format!("unknown node kind with nodeType {}", node.node_type))
}

fn category_of(body: &NodeBody) -> Option<NodeCategory> {
    Some(match body {
        NodeBody::BinaryOp { .. } => NodeCategory::Binary,
        NodeBody::UnaryOp { .. } => NodeCategory::Unary,
        NodeBody::Conditional { .. } => NodeCategory::Conditional,
        NodeBody::Constant { .. } => NodeCategory::Constant,
        NodeBody::Default {} => NodeCategory::Default,
        NodeBody::Index { .. } => NodeCategory::Index,
        NodeBody::Invocation { .. } => NodeCategory::Invocation,
        NodeBody::Lambda { .. } => NodeCategory::Lambda,
        NodeBody::MemberAccess { .. } => NodeCategory::MemberAccess,
        NodeBody::MethodCall { .. } => NodeCategory::MethodCall,
        NodeBody::NewArray { .. } => NodeCategory::NewArray,
        NodeBody::NewObject { .. } => NodeCategory::NewObject,
        NodeBody::Parameter { .. } => NodeCategory::Parameter,
        NodeBody::RuntimeVariablesGroup { .. } => NodeCategory::RuntimeVariables,
        NodeBody::TypeTest { .. } => NodeCategory::TypeTest,
        NodeBody::Block { .. } => NodeCategory::Block,
        NodeBody::Unknown => return None,
    })
}
