use std::fs;

const SECTIONS: &[&str] = &[
    "page",
    "fonts",
    "colors",
    "paragraph",
    "heading",
    "list",
    "code",
    "table",
    "section",
    "cover",
    "output",
];

fn main() {
    // The shipped defaults are embedded with include_str!, so reject a broken file here.
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={config_path}");

    let content = fs::read_to_string(config_path).expect("read src/default_config.toml");
    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("src/default_config.toml is not valid TOML: {e}"),
    };

    for section in SECTIONS {
        if !table.get(*section).is_some_and(toml::Value::is_table) {
            panic!("src/default_config.toml is missing the [{section}] table");
        }
    }
}
