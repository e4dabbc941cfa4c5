use addx_config::RegistrationConfig;
use addx_syntax::{Attribute, MethodDeclaration, Parameter, SyntaxKind, Type};

/// Attributes that opt a method in or out of registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerAttribute {
    /// `[RegistrationMethod]`
    RegistrationMethod,
    /// `[IgnoreRegistrationMethod]`
    IgnoreRegistrationMethod,
}

impl MarkerAttribute {
    pub const ALL: [MarkerAttribute; 2] = [
        MarkerAttribute::RegistrationMethod,
        MarkerAttribute::IgnoreRegistrationMethod,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MarkerAttribute::RegistrationMethod => "RegistrationMethod",
            MarkerAttribute::IgnoreRegistrationMethod => "IgnoreRegistrationMethod",
        }
    }

    /// Matches an attribute by its normalized name, so `[RegistrationMethod]`,
    /// `[RegistrationMethodAttribute]` and `[My.Ns.RegistrationMethod]` all
    /// resolve to the same marker.
    pub fn from_attribute(attribute: &Attribute) -> Option<MarkerAttribute> {
        let name = attribute.name()?.segments().pop()?;
        let normalized = normalize_attribute_name(&name);
        Self::ALL.into_iter().find(|marker| marker.name() == normalized)
    }
}

fn normalize_attribute_name(name: &str) -> &str {
    match name.strip_suffix("Attribute") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => name,
    }
}

/// How a method relates to registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Carries `[IgnoreRegistrationMethod]`.
    Ignored,
    /// Carries `[RegistrationMethod]`.
    Marked,
    /// `static C M(this C services, ...)` where `C` is the container type.
    Conventional,
    NotEligible,
    /// Would qualify but has no block body to insert into.
    MissingBody,
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        matches!(self, Eligibility::Marked | Eligibility::Conventional)
    }
}

pub fn classify_method(method: &MethodDeclaration, options: &RegistrationConfig) -> Eligibility {
    let markers: Vec<MarkerAttribute> = method
        .modifiers()
        .map(|modifiers| {
            modifiers
                .attributes()
                .filter_map(|attribute| MarkerAttribute::from_attribute(&attribute))
                .collect()
        })
        .unwrap_or_default();

    if markers.contains(&MarkerAttribute::IgnoreRegistrationMethod) {
        return Eligibility::Ignored;
    }

    let eligibility = if markers.contains(&MarkerAttribute::RegistrationMethod) {
        Eligibility::Marked
    } else if is_conventional(method, options) {
        Eligibility::Conventional
    } else {
        return Eligibility::NotEligible;
    };

    if method.body().is_none() {
        return Eligibility::MissingBody;
    }
    eligibility
}

fn is_conventional(method: &MethodDeclaration, options: &RegistrationConfig) -> bool {
    let is_static = method
        .modifiers()
        .is_some_and(|modifiers| modifiers.has(SyntaxKind::StaticKw));
    if !is_static {
        return false;
    }
    if !method
        .return_type()
        .is_some_and(|ty| is_container_type(&ty, &options.container_type))
    {
        return false;
    }
    first_parameter(method).is_some_and(|param| {
        let is_extension = param
            .modifiers()
            .is_some_and(|modifiers| modifiers.has(SyntaxKind::ThisKw));
        is_extension
            && param
                .ty()
                .is_some_and(|ty| is_container_type(&ty, &options.container_type))
    })
}

pub(crate) fn first_parameter(method: &MethodDeclaration) -> Option<Parameter> {
    method.parameter_list()?.parameters().next()
}

/// `true` for a plain named type whose last segment is `container_type`.
///
/// `IServiceCollection?`, `IServiceCollection[]` and generic lookalikes do
/// not count.
pub fn is_container_type(ty: &Type, container_type: &str) -> bool {
    if ty.is_nullable() || ty.is_array() {
        return false;
    }
    let Some(named) = ty.named_type() else {
        return false;
    };
    !named.is_generic() && named.last_segment().as_deref() == Some(container_type)
}
