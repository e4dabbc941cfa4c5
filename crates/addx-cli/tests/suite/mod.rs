mod apply;
mod candidates;
mod parse;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;

pub(crate) const BAR: &str = r#"namespace App.Top.Nested
{
    public class Bar
    {
        public int Prop { get; set; }
    }
}
"#;

pub(crate) const REGISTRATOR: &str = r#"using Microsoft.Extensions.DependencyInjection;

namespace App.Top
{
    public static class Registrator
    {
        public static IServiceCollection RegisterServices(this IServiceCollection services)
        {
            return services;
        }
    }
}
"#;

pub(crate) fn addx() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("addx"));
    cmd.env_remove("ADDX_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// A project root with `Top/Nested/Bar.cs` and `Top/Registrator.cs`.
pub(crate) fn project() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    temp.child("App.csproj").write_str("<Project />").unwrap();
    temp.child("Top/Nested/Bar.cs").write_str(BAR).unwrap();
    temp.child("Top/Registrator.cs")
        .write_str(REGISTRATOR)
        .unwrap();
    temp
}

/// Byte offset of the `Bar` identifier in [`BAR`].
pub(crate) fn bar_offset() -> String {
    (BAR.find("class Bar").unwrap() + "class ".len()).to_string()
}
