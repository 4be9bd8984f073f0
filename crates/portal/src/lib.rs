//! Cadastro Portal: a small authenticated customer-portal front end.
//!
//! Routes visitors between a public landing page and an authenticated area,
//! and serves a registration-data ("dados cadastrais") lookup backed by an
//! injected [`cadastro::DadosCadastraisService`]. Session validation is a
//! supplied capability behind [`session::SessionStore`].

pub mod cadastro;
pub mod config;
pub mod server;
pub mod session;
pub mod views;


pub use server::{build_router, start_server, AppState};
