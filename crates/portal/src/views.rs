//! Minimal server-rendered pages for the portal.
//!
//! No template engine: each view is a function producing static markup with
//! the model interpolated. The markup carries no contract beyond the pieces
//! the tests look for (the unauthorized message, the rendered name, the
//! correlation id on the error page).

use crate::cadastro::DadosCadastrais;

/// Model for the generic error page: just a best-effort correlation id.
#[derive(Debug, Clone, Default)]
pub struct ErrorViewModel {
    pub request_id: Option<String>,
}

impl ErrorViewModel {
    pub fn show_request_id(&self) -> bool {
        self.request_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="utf-8">
    <title>{title} - Portal do Cliente</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 700px; margin: 50px auto; padding: 20px; background: #f5f5f5; }}
        .container {{ background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        h1 {{ color: #333; border-bottom: 3px solid #4CAF50; padding-bottom: 10px; }}
        dt {{ font-weight: bold; margin-top: 10px; }}
        .muted {{ color: #666; font-size: 0.9em; }}
    </style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>
"#
    )
}

pub fn landing() -> String {
    page(
        "Bem-vindo",
        r#"        <h1>Portal do Cliente</h1>
        <p>Bem-vindo ao portal. Entre com sua sessão para acessar a área do cliente.</p>
        <p class="muted"><a href="/hero">Área do cliente</a> &middot; <a href="/dados-cadastrais/consultar">Dados cadastrais</a></p>"#,
    )
}

pub fn hero() -> String {
    page(
        "Área do Cliente",
        r#"        <h1>Área do Cliente</h1>
        <p>Você está autenticado.</p>
        <p class="muted"><a href="/dados-cadastrais/consultar">Consultar dados cadastrais</a></p>"#,
    )
}

pub fn nao_logado() -> String {
    page(
        "Não autorizado",
        r#"        <h1>Não autorizado</h1>
        <p>Usuário não logado.</p>"#,
    )
}

pub fn dados_cadastrais(dados: &DadosCadastrais) -> String {
    let telefone = dados.telefone.as_deref().unwrap_or("-");
    let endereco = dados.endereco.as_deref().unwrap_or("-");
    let body = format!(
        r#"        <h1>Dados Cadastrais</h1>
        <dl>
            <dt>Nome</dt><dd>{nome}</dd>
            <dt>E-mail</dt><dd>{email}</dd>
            <dt>Documento</dt><dd>{documento}</dd>
            <dt>Telefone</dt><dd>{telefone}</dd>
            <dt>Endereço</dt><dd>{endereco}</dd>
        </dl>"#,
        nome = dados.nome,
        email = dados.email,
        documento = dados.documento,
    );
    page("Dados Cadastrais", &body)
}

pub fn cadastro_nao_encontrado() -> String {
    page(
        "Cadastro não encontrado",
        r#"        <h1>Cadastro não encontrado</h1>
        <p>Não há dados cadastrais para o usuário informado.</p>"#,
    )
}

pub fn error_page(model: &ErrorViewModel) -> String {
    let request_id = if model.show_request_id() {
        format!(
            r#"        <p class="muted">Request ID: <code>{}</code></p>"#,
            model.request_id.as_deref().unwrap_or_default()
        )
    } else {
        String::new()
    };
    let body = format!(
        r#"        <h1>Erro</h1>
        <p>Ocorreu um erro ao processar sua solicitação.</p>
{request_id}"#
    );
    page("Erro", &body)
}
