use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use once_cell::sync::Lazy;

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
    options.render.hardbreaks = true;
    options
});

#[cfg(not(target_arch = "wasm32"))]
pub fn markdown_to_html(md: &str) -> String {
    use comrak::plugins::syntect::SyntectAdapter;

    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    external_links(&markdown_to_html_with_plugins(
        md,
        &MARKDOWN_OPTIONS,
        &plugins,
    ))
}

#[cfg(target_arch = "wasm32")]
pub fn markdown_to_html(md: &str) -> String {
    let plugins = ComrakPlugins::default();
    external_links(&markdown_to_html_with_plugins(
        md,
        &MARKDOWN_OPTIONS,
        &plugins,
    ))
}

/// Links open in a new tab.
fn external_links(html: &str) -> String {
    html.replace(
        "<a href=",
        "<a target=\"_blank\" rel=\"noopener noreferrer\" href=",
    )
}
