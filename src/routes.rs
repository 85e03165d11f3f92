use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware};
use actix_web::web;
use anyhow::{Result, anyhow};

use crate::{
    api::{leave_request, reports, substitution, transfer},
    config::Config,
    error::json_error_handler,
};

type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-route-family rate limiters, built once at startup and shared by
/// every worker.
#[derive(Clone)]
pub struct Limiters {
    assign: Arc<Limiter>,
    report: Arc<Limiter>,
    protected: Arc<Limiter>,
}

fn build_limiter(name: &str, requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / requests_per_min as u64;
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit for {}: {}/min", name, requests_per_min))?;
    Ok(Governor::new(&cfg))
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            assign: Arc::new(build_limiter("assign", config.rate_assign_per_min)?),
            report: Arc::new(build_limiter("report", config.rate_report_per_min)?),
            protected: Arc::new(build_limiter("protected", config.rate_protected_per_min)?),
        })
    }
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiters: Limiters) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(limiters.protected)
            .service(
                web::scope("/substitutions")
                    // /substitutions/assign
                    .service(
                        web::resource("/assign")
                            .wrap(limiters.assign.clone())
                            .route(web::post().to(substitution::assign_substitute)),
                    )
                    // /substitutions/available
                    .service(web::resource("/available").route(web::get().to(substitution::available_faculty)))
                    // /substitutions/manual
                    .service(web::resource("/manual").route(web::post().to(substitution::create_manual)))
                    // /substitutions/{id}/status
                    .service(web::resource("/{id}/status").route(web::put().to(substitution::update_status)))
                    // /substitutions
                    .service(web::resource("").route(web::get().to(substitution::list_substitutions))),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve runs the assigner, so it shares its limiter
                    .service(
                        web::resource("/{id}/approve")
                            .wrap(limiters.assign)
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave))),
            )
            .service(
                web::scope("/transfers")
                    // /transfers
                    .service(
                        web::resource("")
                            .route(web::get().to(transfer::list_transfers))
                            .route(web::post().to(transfer::create_transfer)),
                    )
                    // /transfers/{id}/respond
                    .service(web::resource("/{id}/respond").route(web::put().to(transfer::respond_transfer)))
                    // /transfers/{id}/cancel
                    .service(web::resource("/{id}/cancel").route(web::put().to(transfer::cancel_transfer))),
            )
            .service(
                web::scope("/reports")
                    .wrap(limiters.report.clone())
                    .service(web::resource("/defaulters").route(web::post().to(reports::defaulters)))
                    .service(web::resource("/monthly-summary").route(web::post().to(reports::summary))),
            )
            .service(
                web::resource("/students/{id}/attendance")
                    .wrap(limiters.report.clone())
                    .route(web::get().to(reports::student_attendance)),
            )
            .service(
                web::resource("/classes/{id}/promotion")
                    .wrap(limiters.report.clone())
                    .route(web::get().to(reports::promotion)),
            )
            .service(
                web::resource("/subjects/{id}/syllabus-progress")
                    .wrap(limiters.report)
                    .route(web::get().to(reports::syllabus)),
            ),
    );
}
