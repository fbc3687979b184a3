//! Writes the TypeScript declarations of every API type to `shared/types.ts`.
//! Run with `--check` to fail instead of writing when the file is stale.

use std::{env, fs, path::PathBuf, process::ExitCode};

use ts_rs::TS;

const HEADER: &str = "// This file was generated by `cargo run --bin generate_types`. Do not edit it by hand.\n\n";

fn declarations() -> Vec<String> {
    vec![
        utils::response::ApiResponse::<()>::decl(),
        db::models::location::PostalAddress::decl(),
        db::models::location::LocationSlug::decl(),
        db::models::location::Location::decl(),
        db::models::location::CreateLocation::decl(),
        db::models::product::Product::decl(),
        db::models::product::CreateProduct::decl(),
        db::models::product::UpdateProduct::decl(),
        db::models::promotion::Promotion::decl(),
        db::models::promotion::CreatePromotion::decl(),
        db::models::promotion::UpdatePromotion::decl(),
        db::models::article::Article::decl(),
        db::models::article::CreateArticle::decl(),
        db::models::article::UpdateArticle::decl(),
        db::models::link::Relation::decl(),
        db::models::link::Link::decl(),
        db::models::link::OverrideGroup::decl(),
        db::models::page::PageDocument::decl(),
        db::models::page::ComponentNode::decl(),
        db::models::page::SavePage::decl(),
        server::routes::links::LinkPair::decl(),
        server::routes::links::LinkCreated::decl(),
        server::routes::links::LinkRemoved::decl(),
        server::routes::links::SyncOverridesRequest::decl(),
        server::routes::links::SyncOverridesResponse::decl(),
        server::routes::pages::PageResponse::decl(),
        server::routes::pages::ResolveDocumentRequest::decl(),
        server::routes::pages::RenderedPage::decl(),
    ]
}

fn generate() -> String {
    let body = declarations()
        .into_iter()
        .map(|decl| {
            let decl = decl.trim_start();
            if decl.starts_with("export") {
                decl.to_string()
            } else {
                format!("export {decl}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{HEADER}{body}\n")
}

fn main() -> ExitCode {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../shared/types.ts");
    let content = generate();

    if env::args().any(|arg| arg == "--check") {
        return match fs::read_to_string(&path) {
            Ok(current) if current == content => {
                println!("{} is up to date", path.display());
                ExitCode::SUCCESS
            }
            _ => {
                eprintln!("{} is stale, run generate_types", path.display());
                ExitCode::FAILURE
            }
        };
    }

    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("failed to create {}: {e}", dir.display());
            return ExitCode::FAILURE;
        }
    }
    if let Err(e) = fs::write(&path, content) {
        eprintln!("failed to write {}: {e}", path.display());
        return ExitCode::FAILURE;
    }
    println!("Wrote {}", path.display());
    ExitCode::SUCCESS
}
