/// Views the client can show. Every path resolves to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    ArticleReader,
    WordPool,
    Review,
    NotFound,
}

const ROUTES: [(&str, Route); 3] = [
    ("/", Route::ArticleReader),
    ("/pool", Route::WordPool),
    ("/review", Route::Review),
];

pub fn routes() -> &'static [(&'static str, Route)] {
    &ROUTES
}

impl Route {
    /// Query strings, fragments and a trailing slash are ignored; unknown
    /// paths resolve to [`Route::NotFound`].
    pub fn resolve(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path {
            "" => "/",
            "/" => path,
            _ => path.strip_suffix('/').unwrap_or(path),
        };

        ROUTES
            .iter()
            .find(|(candidate, _)| *candidate == path)
            .map(|(_, route)| *route)
            .unwrap_or(Route::NotFound)
    }

    pub fn path(self) -> Option<&'static str> {
        ROUTES
            .iter()
            .find(|(_, route)| *route == self)
            .map(|(path, _)| *path)
    }

    pub fn view_name(self) -> &'static str {
        match self {
            Route::ArticleReader => "ArticleReader",
            Route::WordPool => "WordList",
            Route::Review => "Review",
            Route::NotFound => "NotFound",
        }
    }
}
