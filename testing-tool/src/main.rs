use anyhow::{anyhow, Context, Result};
use colored::*;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🚗 alugae.mobi Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let session = login().await?;

    loop {
        println!();
        println!("{}", "📋 MENU PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 👤 Meu usuário");
        println!("2. 🚙 Veículos publicados");
        println!("3. 📅 Checar disponibilidade");
        println!("4. 🧾 Minhas reservas");
        println!("5. 🪪 Status da verificação");
        println!("6. 🪙 Carteira de moedas");
        println!("7. 🚪 Sair");
        let choice = prompt("Escolha uma opção (1-7): ")?;

        let result = match choice.as_str() {
            "1" => session.show(Method::GET, "/api/auth/me", None).await,
            "2" => session.show(Method::GET, "/api/vehicles", None).await,
            "3" => check_availability(&session).await,
            "4" => session.show(Method::GET, "/api/bookings", None).await,
            "5" => session.show(Method::GET, "/api/documents", None).await,
            "6" => session.show(Method::GET, "/api/coins/wallet", None).await,
            "7" => {
                println!("{}", "👋 Até logo!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opção inválida. Tente de novo.".bright_red());
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("{} {:#}", "❌ Erro:".bright_red().bold(), e);
        }
    }

    Ok(())
}

struct Session {
    client: Client,
    base_url: String,
    token: String,
}

impl Session {
    async fn show(&self, method: Method, path: &str, body: Option<Value>) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        println!();
        println!("{} {} {}", "📤".bright_blue(), method, url);

        let mut request = self.client.request(method, &url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.with_context(|| format!("falha chamando {}", url))?;
        print_response(response).await
    }
}

async fn login() -> Result<Session> {
    println!("{}", "🔐 CREDENCIAIS".bright_cyan().bold());
    println!("{}", "==============".bright_cyan());

    let base_url = prompt("URL da API [http://localhost:3000]: ")?;
    let base_url = if base_url.is_empty() {
        "http://localhost:3000".to_string()
    } else {
        base_url.trim_end_matches('/').to_string()
    };
    let email = prompt("E-mail: ")?;
    let password = prompt("Senha: ")?;

    let client = Client::new();
    let response = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .context("falha chamando /api/auth/login")?;

    let status = response.status();
    let body: Value = response.json().await.context("resposta de login não é JSON")?;
    if status != StatusCode::OK {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Err(anyhow!("login falhou com status {}", status));
    }

    let token = body["data"]["token"]
        .as_str()
        .ok_or_else(|| anyhow!("token ausente na resposta de login"))?
        .to_string();
    println!("{}", "✅ Autenticado".bright_green().bold());

    Ok(Session { client, base_url, token })
}

async fn check_availability(session: &Session) -> Result<()> {
    let vehicle_id = prompt("ID do veículo: ")?;
    let start = prompt("Data de retirada (AAAA-MM-DD): ")?;
    let end = prompt("Data de devolução (AAAA-MM-DD): ")?;
    let path = format!(
        "/api/vehicles/{}/availability/check?start_date={}&end_date={}",
        vehicle_id, start, end
    );
    session.show(Method::GET, &path, None).await
}

async fn print_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let text = response.text().await?;

    let label = format!("📥 Status {}", status);
    if status.is_success() {
        println!("{}", label.bright_green().bold());
    } else {
        println!("{}", label.bright_yellow().bold());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
