const JQUERY_SRC: &str = "https://ajax.googleapis.com/ajax/libs/jquery/3.4.1/jquery.min.js";

/// The demo page. `scripts` is the `<script>` output of the defining script.
pub fn render_index(scripts: &str) -> String {
    let content = r#"
<div class="widget">
    <div id="message"></div>
</div>
<div class="widget">
    <button id="greet" type="button">Say hello</button>
    <span id="greeting"></span>
</div>
"#;

    build_page("Tether", content, scripts)
}

/// Error page for a defining script that failed to render.
pub fn render_error() -> String {
    build_page(
        "Error",
        r#"<p class="error">The page could not be rendered.</p>"#,
        "",
    )
}

fn build_page(title: &str, content: &str, scripts: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="{JQUERY_SRC}"></script>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.container{{max-width:960px;margin:0 auto;padding:24px;}}
.widget{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:16px;margin-bottom:12px;}}
#message{{padding:8px;}}
#greet{{padding:6px 16px;background:#0066cc;color:#fff;border:none;border-radius:4px;font-size:13px;cursor:pointer;}}
#greeting{{margin-left:12px;font-size:14px;}}
.error{{color:#c62828;}}
</style>
</head>
<body>
<div class="container">
{content}
</div>
{scripts}</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_loads_jquery_before_scripts() {
        let html = render_index("<script>\nrun();\n</script>\n");
        let jquery = html.find(JQUERY_SRC).unwrap();
        let script = html.find("run();").unwrap();
        assert!(jquery < script);
        assert!(html.contains(r#"<div id="message"></div>"#));
    }
}
