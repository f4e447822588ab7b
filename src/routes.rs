use crate::{
    api::{attendance, dashboard, employee, leave, message, overtime, project, shift},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter)
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter)
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // fixed segments go before /{id}
                    .service(
                        web::resource("/departments")
                            .route(web::get().to(employee::list_departments)),
                    )
                    .service(
                        web::resource("/job-titles").route(web::get().to(employee::list_job_titles)),
                    )
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    .service(web::resource("/today").route(web::get().to(attendance::today)))
                    .service(
                        web::resource("").route(web::get().to(attendance::list_attendance)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(web::resource("/balance").route(web::get().to(leave::toil_balance)))
                    .service(
                        web::resource("")
                            .route(web::get().to(leave::leave_list))
                            .route(web::post().to(leave::create_leave)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(leave::get_leave)))
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(leave::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(leave::reject_leave)),
                    ),
            )
            .service(
                web::scope("/overtime")
                    .service(
                        web::resource("")
                            .route(web::get().to(overtime::list_overtime))
                            .route(web::post().to(overtime::create_overtime)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(overtime::approve_overtime)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(overtime::reject_overtime)),
                    ),
            )
            .service(
                web::scope("/shifts")
                    .service(web::resource("/assign").route(web::post().to(shift::assign_shift)))
                    .service(web::resource("/schedule").route(web::get().to(shift::schedule)))
                    .service(
                        web::resource("")
                            .route(web::post().to(shift::create_shift))
                            .route(web::get().to(shift::list_shifts)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(shift::update_shift))
                            .route(web::delete().to(shift::delete_shift)),
                    ),
            )
            .service(
                web::scope("/messages")
                    .service(
                        web::resource("")
                            .route(web::post().to(message::send_message))
                            .route(web::get().to(message::conversation)),
                    )
                    .service(
                        web::resource("/{id}/read").route(web::put().to(message::mark_read)),
                    ),
            )
            .service(
                web::scope("/projects")
                    .service(web::resource("/time").route(web::post().to(project::log_time)))
                    .service(web::resource("/timesheet").route(web::get().to(project::timesheet)))
                    .service(
                        web::resource("")
                            .route(web::post().to(project::create_project))
                            .route(web::get().to(project::list_projects)),
                    )
                    .service(
                        web::resource("/{id}").route(web::put().to(project::update_project)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    .service(web::resource("/summary").route(web::get().to(dashboard::summary)))
                    .service(web::resource("/projects").route(web::get().to(dashboard::projects))),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
