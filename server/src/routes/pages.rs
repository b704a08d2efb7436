//! Placeholder page documents. Titles are fixed text; nothing from the
//! request is echoed into the markup.

use axum::http::StatusCode;
use axum::response::Html;

pub fn render(title: &'static str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><main><h1>{title}</h1></main></body></html>\n"
    ))
}

pub async fn admin_section() -> Html<String> {
    render("Admin")
}

pub async fn seller_section() -> Html<String> {
    render("Seller")
}

pub async fn order() -> Html<String> {
    render("Order")
}

pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, render("Not found"))
}
