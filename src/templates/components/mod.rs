use crate::domain::Listing;
use maud::{html, Markup, DOCTYPE};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// `kind` is one of success, error, info.
pub fn alert(kind: &str, message: &str) -> Markup {
    html! {
        div class=(format!("alert alert-{kind}")) role="status" { (message) }
    }
}

pub fn listings_table(listings: &[&Listing]) -> Markup {
    html! {
        table class="listings" {
            thead {
                tr {
                    th { "TS Number" }
                    th { "Address" }
                    th { "City" }
                    th { "Sale Date" }
                    th { "Price" }
                    th { "Status" }
                }
            }
            tbody {
                @for l in listings {
                    tr {
                        td { (l.ts_number) }
                        td { (l.address) }
                        td { (l.city) }
                        td { (l.date) }
                        td { (l.price) }
                        td { (l.status) }
                    }
                }
            }
        }
    }
}

/// Standalone error page; does not depend on the layout rendering.
pub fn error_page(status: u16, message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Error " (status) }
                style {
                    "body { font-family: system-ui, sans-serif; max-width: 720px; margin: 4rem auto; padding: 1rem; }"
                    "h1 { font-size: 2rem; margin-bottom: 1rem; }"
                    "p { font-size: 1.1rem; color: #444; }"
                }
            }
            body {
                h1 { "Error " (status) }
                p { (message) }
                p { a href="/" { "← Back to home" } }
            }
        }
    }
}
