// templates/pages/home.rs

use crate::templates::{components::card, desktop_layout};
use chrono::NaiveDate;
use maud::{html, Markup};

pub struct HomeVm {
    pub cities: Vec<String>,
    pub latest_csv: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub email_enabled: bool,
}

pub fn home_page(vm: &HomeVm) -> Markup {
    desktop_layout(
        "Foreclosure Listings",
        html! {
            main class="container" {
                h1 { "Foreclosure Auction Listings" }

                (card("Scrape", html! {
                    p { "Collect every listing from the auction site into a new CSV file." }
                    @if let Some(name) = &vm.latest_csv {
                        p { "Latest file: " code { (name) } }
                    } @else {
                        p { "No listings collected yet." }
                    }
                    button
                        hx-post="/scrape_all"
                        hx-target="#scrape-result"
                        hx-swap="innerHTML"
                        hx-disabled-elt="this"
                        hx-indicator="#scrape-spinner"
                    {
                        "Scrape all listings"
                    }
                    span id="scrape-spinner" class="htmx-indicator" { " Scraping, this takes a few minutes…" }
                    div id="scrape-result" {}
                }))

                (card("Filter", filter_form(vm)))

                (card("Files", html! {
                    ul {
                        li { a href="/csv" { "View latest CSV" } }
                        li { a href="/csvdata" { "Download latest CSV" } }
                        li { a href="/cities" { "Cities in latest CSV" } }
                    }
                }))
            }
        },
    )
}

fn filter_form(vm: &HomeVm) -> Markup {
    html! {
        form
            class="filter"
            method="post"
            action="/filter"
            hx-post="/filter"
            hx-target="#filter-result"
            hx-swap="innerHTML"
        {
            label {
                "City "
                select name="city" {
                    option value="all" selected { "All Cities" }
                    @for city in &vm.cities {
                        option value=(city) { (city) }
                    }
                }
            }
            label {
                "From "
                input type="date" name="start_date" value=(vm.start_date.format("%Y-%m-%d")) required;
            }
            label {
                "To "
                input type="date" name="end_date" value=(vm.end_date.format("%Y-%m-%d")) required;
            }
            @if vm.email_enabled {
                label {
                    "Email "
                    input type="email" name="email" placeholder="you@domain.com" autocomplete="email";
                }
            }
            button type="submit" { "Filter" }
            button
                type="submit"
                formmethod="get"
                formaction="/export.xlsx"
                hx-boost="false"
            {
                "Export XLSX"
            }
        }
        div id="filter-result" {}
    }
}
