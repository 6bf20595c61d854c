use maud::{html, Markup, DOCTYPE};

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; }
header { display: flex; align-items: center; gap: 1rem; padding: 0.75rem 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
main.container { max-width: 1100px; margin: 2rem auto; padding: 0 1rem; }
.card { border: 1px solid #e5e7eb; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1.5rem; }
.alert { padding: 0.75rem 1rem; border-radius: 6px; margin: 1rem 0; }
.alert-success { background: #ecfdf5; color: #065f46; }
.alert-error { background: #fef2f2; color: #991b1b; }
.alert-info { background: #eff6ff; color: #1e40af; }
table.listings { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
table.listings th, table.listings td { border-bottom: 1px solid #e5e7eb; padding: 0.4rem; text-align: left; }
form.filter { display: flex; flex-wrap: wrap; gap: 0.75rem; align-items: end; }
.htmx-indicator { display: none; }
.htmx-request .htmx-indicator, .htmx-request.htmx-indicator { display: inline; }
"#;

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (maud::PreEscaped(STYLE)) }
                script src=(HTMX_SRC) defer {};
            }
            body {
              header {
                  svg
                      xmlns="http://www.w3.org/2000/svg"
                      width="24"
                      height="24"
                      viewBox="0 0 24 24"
                      fill="none"
                      stroke="#524ed2"
                      stroke-width="2"
                      stroke-linecap="round"
                      stroke-linejoin="round"
                  {
                      path stroke="none" d="M0 0h24v24H0z" fill="none" {}
                      path d="M5 12l-2 0l9 -9l9 9l-2 0" {}
                      path d="M5 12v7a2 2 0 0 0 2 2h10a2 2 0 0 0 2 -2v-7" {}
                      path d="M9 21v-6a2 2 0 0 1 2 -2h2a2 2 0 0 1 2 2v6" {}
                  }
                  h3 { "Foreclosure Listings" }
                  nav {
                      a href="/" { "Home" }
                      " · "
                      a href="/health" { "Health" }
                      " · "
                      a href="/diagnostics" { "Diagnostics" }
                  }
              }
                (content)
            }
        }
    }
}
