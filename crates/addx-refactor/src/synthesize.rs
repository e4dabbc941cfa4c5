use addx_core::TextEdit;
use addx_syntax::{
    AstNode, Block, Expression, MethodDeclaration, Statement, SyntaxNode, SyntaxToken, TextRange,
    TextSize,
};

use crate::RegistrationError;

/// One `Add{Lifetime}<...>()` call to be spliced into a registration method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub lifetime: String,
    /// `[Service, Implementation]` or `[Implementation]`.
    pub type_arguments: Vec<String>,
}

impl Registration {
    pub fn method_name(&self) -> String {
        format!("Add{}", self.lifetime)
    }

    /// `AddScoped<IFoo, Foo>()`
    pub fn invocation(&self) -> String {
        format!("{}<{}>()", self.method_name(), self.type_arguments.join(", "))
    }

    /// `Register with AddScoped<IFoo, Foo>`
    pub fn title(&self) -> String {
        format!(
            "Register with {}<{}>",
            self.method_name(),
            self.type_arguments.join(", ")
        )
    }
}

/// One registration per lifetime, in configuration order.
pub fn synthesize(
    service: Option<&str>,
    implementation: &str,
    lifetimes: &[String],
) -> Vec<Registration> {
    let type_arguments: Vec<String> = service
        .into_iter()
        .chain(std::iter::once(implementation))
        .map(str::to_string)
        .collect();
    lifetimes
        .iter()
        .map(|lifetime| Registration {
            lifetime: lifetime.clone(),
            type_arguments: type_arguments.clone(),
        })
        .collect()
}

/// Where a registration call goes, decided purely by the body's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceStrategy {
    /// `return services.AddA<X>().AddB<Y>();` gets another `.AddC<Z>()` link
    /// at `offset`, preceded by `separator` (empty, or a newline plus the
    /// indentation of the last link).
    ExtendChain { offset: TextSize, separator: String },
    /// `receiver.AddC<Z>();` followed by `suffix` goes in front of the first
    /// statement.
    InsertStatement { offset: TextSize, suffix: String },
    /// Empty body: `range` is replaced by `prefix`, the return statement, and
    /// `suffix`.
    ReturnCall {
        range: TextRange,
        prefix: String,
        suffix: String,
    },
}

impl SpliceStrategy {
    pub fn render(&self, receiver: &str, registration: &Registration) -> TextEdit {
        let call = registration.invocation();
        match self {
            SpliceStrategy::ExtendChain { offset, separator } => {
                TextEdit::insert(*offset, format!("{separator}.{call}"))
            }
            SpliceStrategy::InsertStatement { offset, suffix } => {
                TextEdit::insert(*offset, format!("{receiver}.{call};{suffix}"))
            }
            SpliceStrategy::ReturnCall {
                range,
                prefix,
                suffix,
            } => TextEdit::new(*range, format!("{prefix}return {receiver}.{call};{suffix}")),
        }
    }
}

/// Chooses how to splice into `body`; `text` is the full text of the file
/// containing it.
pub fn splice_strategy(body: &Block, text: &str) -> Result<SpliceStrategy, RegistrationError> {
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let statements: Vec<Statement> = body.statements().collect();

    if let Some(Statement::ReturnStatement(ret)) = statements.last() {
        if let Some(expr) = ret.expression() {
            if invocation_chain_len(&expr) >= 2 {
                return extend_chain(&expr, newline).ok_or_else(|| malformed(body));
            }
        }
    }

    if let Some(first) = statements.first() {
        let offset = first.syntax().text_range().start();
        let (line_start, before) = line_prefix(text, offset);
        let suffix = if before.chars().all(char::is_whitespace) {
            format!("{newline}{}", &text[line_start..usize::from(offset)])
        } else {
            " ".to_string()
        };
        return Ok(SpliceStrategy::InsertStatement { offset, suffix });
    }

    return_call(body, text, newline)
}

fn extend_chain(expr: &Expression, newline: &str) -> Option<SpliceStrategy> {
    let offset = last_significant_token(expr.syntax())?.text_range().end();

    let Expression::InvocationExpression(last_link) = expr else {
        return None;
    };
    let Some(Expression::MemberAccessExpression(access)) = last_link.expression() else {
        return None;
    };
    let dot = access.operator_token()?;

    let gap: String = std::iter::successors(dot.prev_token(), |tok| tok.prev_token())
        .take_while(|tok| tok.kind().is_trivia())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .map(|tok| tok.text().to_string())
        .collect();
    let separator = match gap.rfind('\n') {
        Some(idx) => {
            let newline = if gap.contains("\r\n") { "\r\n" } else { newline };
            format!("{newline}{}", &gap[idx + 1..])
        }
        None => String::new(),
    };
    Some(SpliceStrategy::ExtendChain { offset, separator })
}

fn return_call(
    body: &Block,
    text: &str,
    newline: &str,
) -> Result<SpliceStrategy, RegistrationError> {
    let (Some(l_brace), Some(r_brace)) = (body.l_brace_token(), body.r_brace_token()) else {
        return Err(malformed(body));
    };
    let has_stray_tokens = body
        .syntax()
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .any(|tok| !tok.kind().is_trivia() && tok != l_brace && tok != r_brace);
    if has_stray_tokens {
        return Err(malformed(body));
    }

    let interior = TextRange::new(l_brace.text_range().end(), r_brace.text_range().start());
    let brace_offset = r_brace.text_range().start();
    let (line_start, before) = line_prefix(text, brace_offset);
    let brace_starts_line = before.chars().all(char::is_whitespace);
    let indent: String = before.chars().take_while(|c| c.is_whitespace()).collect();
    let unit = if indent.contains('\t') { "\t" } else { "    " };

    if text[interior].trim().is_empty() {
        return Ok(SpliceStrategy::ReturnCall {
            range: interior,
            prefix: format!("{newline}{indent}{unit}"),
            suffix: format!("{newline}{indent}"),
        });
    }

    // Only comments inside: keep them and add the statement before `}`.
    if brace_starts_line {
        let at = TextSize::try_from(line_start).unwrap_or(brace_offset);
        Ok(SpliceStrategy::ReturnCall {
            range: TextRange::empty(at),
            prefix: format!("{indent}{unit}"),
            suffix: newline.to_string(),
        })
    } else {
        let prefix = if before.ends_with(char::is_whitespace) { "" } else { " " };
        Ok(SpliceStrategy::ReturnCall {
            range: TextRange::empty(brace_offset),
            prefix: prefix.to_string(),
            suffix: " ".to_string(),
        })
    }
}

/// Number of invocations along the receiver spine of `expr`, which must
/// itself be an invocation.
///
/// `services.AddA<X>().AddB<Y>()` has two.
fn invocation_chain_len(expr: &Expression) -> usize {
    if !matches!(expr, Expression::InvocationExpression(_)) {
        return 0;
    }
    let mut count = 0;
    let mut current = Some(expr.clone());
    while let Some(expr) = current {
        current = match expr {
            Expression::InvocationExpression(invocation) => {
                count += 1;
                invocation.expression()
            }
            Expression::MemberAccessExpression(access) => access.expression(),
            _ => None,
        };
    }
    count
}

fn last_significant_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    let last = node.last_token()?;
    std::iter::successors(Some(last), |tok| tok.prev_token())
        .take_while(|tok| node.text_range().contains_range(tok.text_range()))
        .find(|tok| !tok.kind().is_trivia())
}

/// Start of the line containing `offset` and the text between it and `offset`.
fn line_prefix(text: &str, offset: TextSize) -> (usize, &str) {
    let offset = usize::from(offset);
    let line_start = text[..offset].rfind('\n').map_or(0, |idx| idx + 1);
    (line_start, &text[line_start..offset])
}

fn malformed(body: &Block) -> RegistrationError {
    let method = body
        .syntax()
        .parent()
        .and_then(MethodDeclaration::cast)
        .and_then(|method| method.name_token())
        .map(|name| name.text().to_string())
        .unwrap_or_default();
    RegistrationError::MalformedMethodBody { method }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addx_core::apply_text_edits;
    use addx_syntax::parse_csharp;
    use pretty_assertions::assert_eq;

    fn lifetimes() -> Vec<String> {
        ["Singleton", "Scoped", "Transient"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Splices `registration` into the single method of `text`.
    fn splice(text: &str, registration: &Registration) -> String {
        let root = parse_csharp(text).syntax();
        let body = root
            .descendants()
            .find_map(MethodDeclaration::cast)
            .and_then(|method| method.body())
            .expect("fixture has a method body");
        let strategy = splice_strategy(&body, text).unwrap();
        let edit = strategy.render("services", registration);
        apply_text_edits(text, &[edit]).unwrap()
    }

    fn registration(lifetime: &str, type_arguments: &[&str]) -> Registration {
        Registration {
            lifetime: lifetime.to_string(),
            type_arguments: type_arguments.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn one_registration_per_lifetime() {
        let regs = synthesize(Some("IFoo"), "Foo", &lifetimes());
        let titles: Vec<_> = regs.iter().map(Registration::title).collect();
        assert_eq!(
            titles,
            vec![
                "Register with AddSingleton<IFoo, Foo>",
                "Register with AddScoped<IFoo, Foo>",
                "Register with AddTransient<IFoo, Foo>",
            ]
        );

        let regs = synthesize(None, "Foo", &["Scoped".to_string()]);
        assert_eq!(regs, vec![registration("Scoped", &["Foo"])]);
        assert_eq!(regs[0].invocation(), "AddScoped<Foo>()");
    }

    #[test]
    fn inserts_statement_before_the_first_statement() {
        let before = r#"
public static class Registrator
{
    public static IServiceCollection RegisterServices(this IServiceCollection services)
    {
        return services.AddSingleton<Test>();
    }
}
"#;
        let after = r#"
public static class Registrator
{
    public static IServiceCollection RegisterServices(this IServiceCollection services)
    {
        services.AddSingleton<Foo>();
        return services.AddSingleton<Test>();
    }
}
"#;
        assert_eq!(splice(before, &registration("Singleton", &["Foo"])), after);
    }

    #[test]
    fn inserts_inline_when_the_statement_shares_the_brace_line() {
        let before = "class R { static IServiceCollection M(this IServiceCollection services) { return services; } }";
        let after = "class R { static IServiceCollection M(this IServiceCollection services) { services.AddScoped<Foo>(); return services; } }";
        assert_eq!(splice(before, &registration("Scoped", &["Foo"])), after);
    }

    #[test]
    fn extends_multiline_chain() {
        let before = r#"
public static class Registrator
{
    public static IServiceCollection RegisterServices(this IServiceCollection services)
    {
        return services.AddSingleton<Test1>()
            .AddScoped<ITest2, Test2>();
    }
}
"#;
        let after = r#"
public static class Registrator
{
    public static IServiceCollection RegisterServices(this IServiceCollection services)
    {
        return services.AddSingleton<Test1>()
            .AddScoped<ITest2, Test2>()
            .AddTransient<Foo>();
    }
}
"#;
        assert_eq!(splice(before, &registration("Transient", &["Foo"])), after);
    }

    #[test]
    fn extends_single_line_chain_inline() {
        let before = "class R { static IServiceCollection M(this IServiceCollection services) { return services.AddSingleton<X>().AddScoped<Y, Z>(); } }";
        let after = "class R { static IServiceCollection M(this IServiceCollection services) { return services.AddSingleton<X>().AddScoped<Y, Z>().AddTransient<Foo>(); } }";
        assert_eq!(splice(before, &registration("Transient", &["Foo"])), after);
    }

    #[test]
    fn single_invocation_is_not_a_chain() {
        let before = "class R { static IServiceCollection M(this IServiceCollection services) { return services.AddSingleton<X>(); } }";
        let after = "class R { static IServiceCollection M(this IServiceCollection services) { services.AddScoped<Foo>(); return services.AddSingleton<X>(); } }";
        assert_eq!(splice(before, &registration("Scoped", &["Foo"])), after);
    }

    #[test]
    fn chain_must_be_the_last_statement() {
        let before = "class R { void M(IServiceCollection services) { var x = services.A().B(); Log(); } }";
        let after = "class R { void M(IServiceCollection services) { services.AddScoped<Foo>(); var x = services.A().B(); Log(); } }";
        assert_eq!(splice(before, &registration("Scoped", &["Foo"])), after);
    }

    #[test]
    fn empty_body_gets_a_return_statement() {
        let before = "
public static class Registrator
{
    public static IServiceCollection RegisterServices(this IServiceCollection services)
    {

    }
}
";
        let after = "
public static class Registrator
{
    public static IServiceCollection RegisterServices(this IServiceCollection services)
    {
        return services.AddTransient<IBar, Foo>();
    }
}
";
        assert_eq!(splice(before, &registration("Transient", &["IBar", "Foo"])), after);
    }

    #[test]
    fn empty_inline_body_is_expanded() {
        let before = "class R\n{\n    static IServiceCollection M(this IServiceCollection services) { }\n}\n";
        let after = "class R\n{\n    static IServiceCollection M(this IServiceCollection services) {\n        return services.AddScoped<Foo>();\n    }\n}\n";
        assert_eq!(splice(before, &registration("Scoped", &["Foo"])), after);
    }

    #[test]
    fn empty_body_keeps_comments_and_tabs() {
        let before = "class R\n{\n\tstatic IServiceCollection M(this IServiceCollection services)\n\t{\n\t\t// nothing yet\n\t}\n}\n";
        let after = "class R\n{\n\tstatic IServiceCollection M(this IServiceCollection services)\n\t{\n\t\t// nothing yet\n\t\treturn services.AddScoped<Foo>();\n\t}\n}\n";
        assert_eq!(splice(before, &registration("Scoped", &["Foo"])), after);
    }

    #[test]
    fn crlf_line_endings_are_preserved() {
        let before = "class R\r\n{\r\n    static IServiceCollection M(this IServiceCollection services)\r\n    {\r\n        return services;\r\n    }\r\n}\r\n";
        let after = "class R\r\n{\r\n    static IServiceCollection M(this IServiceCollection services)\r\n    {\r\n        services.AddScoped<Foo>();\r\n        return services;\r\n    }\r\n}\r\n";
        assert_eq!(splice(before, &registration("Scoped", &["Foo"])), after);
    }

    #[test]
    fn unterminated_body_is_malformed() {
        let text = "class R { static IServiceCollection Setup(this IServiceCollection services) { ";
        let root = parse_csharp(text).syntax();
        let body = root
            .descendants()
            .find_map(MethodDeclaration::cast)
            .and_then(|method| method.body())
            .unwrap();
        assert_eq!(
            splice_strategy(&body, text),
            Err(RegistrationError::MalformedMethodBody {
                method: "Setup".to_string()
            })
        );
    }
}
