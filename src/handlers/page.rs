use axum::response::{Html, IntoResponse, Redirect, Response};

/// What a page handler decided to do.
#[derive(Debug)]
pub enum Page {
    /// Send this document.
    Render(Html<String>),
    /// Send the client elsewhere (303 See Other).
    Redirect(&'static str),
}

impl Page {
    pub fn render(html: String) -> Self {
        Page::Render(Html(html))
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match self {
            Page::Render(html) => html.into_response(),
            Page::Redirect(path) => Redirect::to(path).into_response(),
        }
    }
}
