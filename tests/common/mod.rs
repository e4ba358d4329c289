//! Shared test fixtures: slices of a small ride-community app.

#![allow(dead_code, unused_imports)]

use slicestore::{reducer_fn, Action, IntoReducer, SliceReducer, StateTree, Store};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserSchema {
    pub auth_data: Option<String>,
    pub inited: bool,
}

/// Always-present `user` slice.
pub struct UserReducer;

impl SliceReducer for UserReducer {
    type State = UserSchema;

    fn reduce(&self, state: UserSchema, action: &Action) -> UserSchema {
        match action.kind.as_str() {
            "user/setAuthData" => UserSchema {
                auth_data: action.payload_as(),
                ..state
            },
            "user/initAuthData" => UserSchema {
                inited: true,
                ..state
            },
            "user/logout" => UserSchema {
                auth_data: None,
                ..state
            },
            _ => state,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginSchema {
    pub username: String,
    pub password: String,
}

/// `loginForm` slice, mounted by the login form.
pub struct LoginReducer;

impl SliceReducer for LoginReducer {
    type State = LoginSchema;

    fn reduce(&self, state: LoginSchema, action: &Action) -> LoginSchema {
        match action.kind.as_str() {
            "login/setUsername" => LoginSchema {
                username: action.payload_as().unwrap_or_default(),
                ..state
            },
            "login/setPassword" => LoginSchema {
                password: action.payload_as().unwrap_or_default(),
                ..state
            },
            _ => state,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleDetailsSchema {
    pub is_loading: bool,
    pub title: Option<String>,
}

/// `articleDetails` slice, mounted by the article page.
pub struct ArticleDetailsReducer;

impl SliceReducer for ArticleDetailsReducer {
    type State = ArticleDetailsSchema;

    fn reduce(&self, state: ArticleDetailsSchema, action: &Action) -> ArticleDetailsSchema {
        match action.kind.as_str() {
            "articleDetails/pending" => ArticleDetailsSchema {
                is_loading: true,
                ..state
            },
            "articleDetails/fulfilled" => ArticleDetailsSchema {
                is_loading: false,
                title: action.payload_as(),
            },
            _ => state,
        }
    }
}

/// Slice that records the kind of every action it sees.
pub fn history() -> impl IntoReducer {
    reducer_fn(|seen: Vec<String>, action: &Action| {
        let mut seen = seen;
        seen.push(action.kind.clone());
        seen
    })
}

/// `i64` slice applying `f` to the payload of "SET" actions.
pub fn setter(f: fn(i64) -> i64) -> impl IntoReducer {
    reducer_fn(move |value: i64, action: &Action| {
        if action.is("SET") {
            action.payload_as::<i64>().map(f).unwrap_or(value)
        } else {
            value
        }
    })
}

pub fn set(value: i64) -> Action {
    Action::new("SET").with_payload(value)
}

/// Store with the base `user` slice only.
pub fn base_store() -> Store {
    Store::builder()
        .slice("user", UserReducer)
        .build()
        .expect("base store")
}

pub fn keys(tree: &StateTree) -> Vec<String> {
    tree.keys().map(|key| key.to_string()).collect()
}
