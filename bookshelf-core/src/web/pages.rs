//! Server-rendered HTML
//!
//! Every dynamic value passes through [`escape`] before it reaches markup.

use std::fmt::Write;

use crate::domain::{Book, BookDetail};

/// Escape text for safe inclusion in HTML content and attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} - Bookshelf</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

const MEMBER_NAV: &str = "<nav><a href=\"/index\">Search</a> | <a href=\"/logout\">Log out</a></nav>";

pub fn login_page(notice: Option<&str>) -> String {
    let notice = notice
        .map(|n| format!("<p class=\"notice\">{}</p>\n", escape(n)))
        .unwrap_or_default();
    layout(
        "Log in",
        &format!(
            "<h1>Log in</h1>\n{}<form method=\"post\" action=\"/\">\n\
             <input name=\"username\" placeholder=\"Username\" autofocus>\n\
             <input name=\"password\" type=\"password\" placeholder=\"Password\">\n\
             <button type=\"submit\">Log in</button>\n</form>\n\
             <p>No account? <a href=\"/register\">Register</a></p>",
            notice
        ),
    )
}

pub fn register_page() -> String {
    layout(
        "Register",
        "<h1>Register</h1>\n<form method=\"post\" action=\"/register\">\n\
         <input name=\"username\" placeholder=\"Username\" autofocus>\n\
         <input name=\"password\" type=\"password\" placeholder=\"Password\">\n\
         <button type=\"submit\">Register</button>\n</form>\n\
         <p>Already registered? <a href=\"/\">Log in</a></p>",
    )
}

fn search_form(query: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/index\">\n\
         <input name=\"search\" value=\"{}\" placeholder=\"ISBN, title or author\">\n\
         <button type=\"submit\">Search</button>\n</form>",
        escape(query)
    )
}

pub fn index_page() -> String {
    layout(
        "Search",
        &format!("{}\n<h1>Find a book</h1>\n{}", MEMBER_NAV, search_form("")),
    )
}

pub fn search_results_page(query: &str, books: &[Book]) -> String {
    let mut body = format!("{}\n<h1>Results</h1>\n{}\n", MEMBER_NAV, search_form(query));

    if books.is_empty() {
        body.push_str("<p>No books matched.</p>");
    } else {
        body.push_str("<ul>\n");
        for book in books {
            let _ = writeln!(
                body,
                "<li><a href=\"/books/{}\">{}</a> by {} ({})</li>",
                book.id,
                escape(&book.title),
                escape(&book.author),
                book.year
            );
        }
        body.push_str("</ul>");
    }

    layout("Results", &body)
}

pub fn book_page(detail: &BookDetail) -> String {
    let book = &detail.book;
    let mut body = format!(
        "{nav}\n<h1>{title}</h1>\n<dl>\n\
         <dt>Author</dt><dd>{author}</dd>\n\
         <dt>Year</dt><dd>{year}</dd>\n\
         <dt>ISBN</dt><dd>{isbn}</dd>\n\
         <dt>Bookshelf rating</dt><dd>{local:.2} from {count} review(s)</dd>\n\
         <dt>Goodreads rating</dt><dd>{remote:.2} from {remote_count} rating(s)</dd>\n\
         </dl>\n",
        nav = MEMBER_NAV,
        title = escape(&book.title),
        author = escape(&book.author),
        year = book.year,
        isbn = escape(&book.isbn),
        local = detail.local_average,
        count = detail.reviews.len(),
        remote = detail.remote.average_rating,
        remote_count = detail.remote.review_count,
    );

    body.push_str("<h2>Reviews</h2>\n");
    if detail.reviews.is_empty() {
        body.push_str("<p>No reviews yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for review in &detail.reviews {
            let _ = writeln!(
                body,
                "<li><strong>{}</strong> rated {}/5<p>{}</p></li>",
                escape(&review.username),
                review.score,
                escape(&review.body)
            );
        }
        body.push_str("</ul>\n");
    }

    let _ = write!(
        body,
        "<h2>Write a review</h2>\n<form method=\"post\" action=\"/books/{}\">\n\
         <select name=\"score\">\
         <option>1</option><option>2</option><option>3</option>\
         <option>4</option><option selected>5</option></select>\n\
         <textarea name=\"review\" rows=\"4\"></textarea>\n\
         <button type=\"submit\">Submit</button>\n</form>",
        book.id
    );

    layout(&book.title, &body)
}

pub fn error_page(message: &str) -> String {
    layout(
        "Error",
        &format!(
            "<h1>Something went wrong</h1>\n<p class=\"error\">{}</p>\n\
             <p><a href=\"javascript:history.back()\">Go back</a></p>",
            escape(message)
        ),
    )
}
