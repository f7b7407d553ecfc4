#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_web::{middleware::Logger, web, App, HttpRequest, HttpResponse, HttpServer};
use greenlight::{
    handlers::{health, sign_in_page},
    settings::GreenlightSettings,
    utils::ResponseBuilder,
    Greenlight, UserData,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = GreenlightSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let greenlight = Greenlight::from_settings(&settings, on_login)
        .map_err(|e| std::io::Error::other(format!("Failed to initialize providers: {e}")))?;

    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings, &greenlight);

    HttpServer::new(move || {
        let greenlight = greenlight.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| greenlight.configure(cfg))
            .route("/ping", web::get().to(health))
            .route("/", web::get().to(sign_in_page))
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn on_login(_req: &HttpRequest, user: &UserData) -> HttpResponse {
    log::info!("👋 Welcome {} <{}>", user.name, user.email);
    ResponseBuilder::redirect("/", Vec::new())
}

fn print_startup_info(bind_address: &str, settings: &GreenlightSettings, greenlight: &Greenlight) {
    let base_url = &settings.application.redirect_base_url;
    let mount = greenlight.mount_path();

    println!("Starting Greenlight v{} on http://{bind_address}", greenlight::VERSION);
    println!();
    println!("Login endpoints:");
    for name in greenlight.provider_names() {
        println!("  GET  {mount}/{name}/login");
        println!("       callback URL to register with {name}: {base_url}{mount}/{name}/callback");
    }
    println!();
    println!("Session endpoints:");
    println!("  GET  {mount}/user     - Current user as JSON");
    println!("  GET  {mount}/logout   - Clear session");
    println!();
    println!("System endpoints:");
    println!("  GET  /ping            - Health check");
    println!("  GET  /                - Sign-in page");
}
