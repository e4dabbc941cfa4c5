use addx_refactor::RegistrationConfig;
use pretty_assertions::assert_eq;

use crate::suite::fixture::Fixture;

#[test]
fn nearest_folder_beats_marked_method_further_out() {
    let fixture = Fixture::new(
        r#"
//- /Features/Orders/OrderService.cs
public class Order$0Service { }
//- /Features/Orders/OrdersModule.cs
public static class OrdersModule
{
    public static IServiceCollection AddOrders(this IServiceCollection services)
    {
        return services;
    }
}
//- /Registrations.cs
public class Registrations
{
    [RegistrationMethod]
    public void Register(IServiceCollection services)
    {
    }
}
"#,
    );
    let candidates = fixture.candidates();
    assert_eq!(
        fixture.path(candidates[0].file()),
        "Features/Orders/OrdersModule.cs"
    );
}

#[test]
fn ignored_method_defers_to_outer_folder() {
    let fixture = Fixture::new(
        r#"
//- /Features/Orders/OrderService.cs
public class Order$0Service { }
//- /Features/Orders/OrdersModule.cs
public static class OrdersModule
{
    [IgnoreRegistrationMethod]
    public static IServiceCollection AddOrders(this IServiceCollection services)
    {
        return services;
    }
}
//- /Registrations.cs
public class Registrations
{
    [RegistrationMethod]
    public void Register(IServiceCollection collection)
    {
        collection.AddLogging();
    }
}
"#,
    );
    let candidates = fixture.candidates();
    assert_eq!(fixture.path(candidates[0].file()), "Registrations.cs");

    let text = fixture.applied(&candidates[0], "Registrations.cs");
    assert!(
        text.contains("collection.AddSingleton<OrderService>();\n        collection.AddLogging();"),
        "{text}"
    );
}

#[test]
fn startup_configure_services_is_used() {
    let fixture = Fixture::new(
        r#"
//- /Web/Services/Clock.cs
namespace Web.Services
{
    public class Clo$0ck : IClock { }
}
//- /Web/Startup.cs
using Microsoft.AspNetCore.Builder;
using Microsoft.Extensions.DependencyInjection;

namespace Web
{
    public class Startup
    {
        public void ConfigureServices(IServiceCollection services)
        {
            services.AddControllers();
        }

        public void Configure(IApplicationBuilder app)
        {
        }
    }
}
"#,
    );
    let candidates = fixture.candidates();
    assert_eq!(candidates.len(), 6);

    let expected = r#"using Microsoft.AspNetCore.Builder;
using Microsoft.Extensions.DependencyInjection;
using Web.Services;

namespace Web
{
    public class Startup
    {
        public void ConfigureServices(IServiceCollection services)
        {
            services.AddScoped<Clock>();
            services.AddControllers();
        }

        public void Configure(IApplicationBuilder app)
        {
        }
    }
}
"#;
    assert_eq!(fixture.applied(&candidates[1], "Web/Startup.cs"), expected);
}

#[test]
fn configured_names_are_honored() {
    let fixture = Fixture::new(
        r#"
//- /Api/Handler.cs
public class Hand$0ler { }
//- /Api/Program.cs
public class Program
{
    public void AddServices(IContainer container)
    {
    }
}
"#,
    );
    assert!(fixture.candidates().is_empty());

    let options = RegistrationConfig {
        container_type: "IContainer".to_string(),
        startup_file: "Program".to_string(),
        configure_services_method: "AddServices".to_string(),
        ..RegistrationConfig::default()
    };
    let candidates = fixture.candidates_with(&options);
    assert_eq!(candidates.len(), 3);

    let text = fixture.applied(&candidates[0], "Api/Program.cs");
    assert!(
        text.contains("{\n        return container.AddSingleton<Handler>();\n    }"),
        "{text}"
    );
}

#[test]
fn empty_configure_services_gets_a_return_call() {
    // Body shape alone picks the strategy; the `void` return type is not consulted.
    let fixture = Fixture::new(
        r#"
//- /Clock.cs
public class Clo$0ck { }
//- /Startup.cs
public class Startup
{
    public void ConfigureServices(IServiceCollection services) { }
}
"#,
    );
    let candidates = fixture.candidates();
    let text = fixture.applied(&candidates[0], "Startup.cs");
    assert!(
        text.contains("return services.AddSingleton<Clock>();"),
        "{text}"
    );
}
