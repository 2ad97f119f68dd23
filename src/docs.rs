//! OpenAPI document served at `/swagger-ui` and `/scalar`.
//!
//! Schemas referenced from handler `body = ...` attributes are collected
//! automatically; only the shared enums are listed by hand.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use campusdesk_core::ErrorResponse;

use crate::modules::announcements::{AnnouncementCategory, AnnouncementPriority};
use crate::modules::clubs::MembershipStatus;
use crate::modules::emergency::EmergencyStatus;
use crate::modules::events::EventType;
use crate::modules::locations::LocationCategory;
use crate::modules::{
    admin, announcements, auth, authority, clubs, emergency, events, faculty, forum, locations,
    lost_found, marketplace, problems, student,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::controller::admin_login,
        auth::controller::student_login,
        auth::controller::faculty_login,
        auth::controller::authority_login,
        auth::controller::register_admin,
        admin::controller::create_class,
        admin::controller::get_classes,
        admin::controller::delete_class,
        admin::controller::create_faculty,
        admin::controller::get_faculties,
        admin::controller::delete_faculty,
        admin::controller::create_student,
        admin::controller::get_students,
        admin::controller::delete_student,
        admin::controller::bulk_create_students,
        admin::controller::create_authority,
        admin::controller::get_authorities,
        admin::controller::delete_authority,
        admin::controller::create_domain,
        admin::controller::get_domains,
        admin::controller::get_domain_authorities,
        admin::controller::add_authority_to_domain,
        admin::controller::send_work_report,
        authority::controller::get_complaints,
        authority::controller::accept_complaint,
        authority::controller::transfer_complaint,
        authority::controller::update_complaint_status,
        authority::controller::get_assigned_complaints,
        authority::controller::get_stats,
        authority::controller::get_colleagues,
        authority::controller::create_domain,
        authority::controller::get_all_domains,
        authority::controller::get_my_domain,
        authority::controller::get_domain,
        authority::controller::update_domain,
        authority::controller::delete_domain,
        faculty::controller::get_my_classes,
        faculty::controller::get_class_details,
        faculty::controller::add_lecture,
        faculty::controller::mark_attendance,
        faculty::controller::add_grade,
        faculty::controller::add_bulk_grades,
        faculty::controller::add_note,
        faculty::controller::add_discussion,
        faculty::controller::add_reply,
        student::controller::get_profile,
        student::controller::update_profile,
        student::controller::get_domains,
        student::controller::explore_classes,
        student::controller::enroll_class,
        student::controller::get_class_details,
        student::controller::add_note,
        student::controller::add_past_paper,
        student::controller::add_discussion,
        student::controller::add_reply,
        problems::controller::create_problem,
        problems::controller::get_student_problems,
        problems::controller::get_domain_problems,
        problems::controller::get_problems_by_domain,
        problems::controller::update_problem,
        problems::controller::get_all_problems,
        lost_found::controller::create_item,
        lost_found::controller::get_items,
        lost_found::controller::get_my_items,
        lost_found::controller::claim_item,
        lost_found::controller::update_item,
        lost_found::controller::delete_item,
        marketplace::controller::create_item,
        marketplace::controller::get_items,
        marketplace::controller::get_my_items,
        marketplace::controller::mark_sold,
        marketplace::controller::update_item,
        marketplace::controller::delete_item,
        forum::controller::get_posts,
        forum::controller::get_post,
        forum::controller::create_post,
        forum::controller::delete_post,
        forum::controller::upvote_post,
        forum::controller::downvote_post,
        forum::controller::add_comment,
        forum::controller::flag_post,
        events::controller::create_event,
        events::controller::get_faculty_events,
        events::controller::update_event,
        events::controller::delete_event,
        events::controller::get_student_events,
        events::controller::register_for_event,
        events::controller::unregister_from_event,
        events::controller::get_all_events,
        events::controller::get_event,
        clubs::controller::get_clubs,
        clubs::controller::get_club,
        clubs::controller::create_club,
        clubs::controller::join_club,
        clubs::controller::leave_club,
        clubs::controller::update_club,
        clubs::controller::add_announcement,
        clubs::controller::add_gallery_image,
        clubs::controller::get_requests,
        clubs::controller::approve_request,
        clubs::controller::reject_request,
        clubs::controller::create_club_event,
        announcements::controller::get_announcements,
        announcements::controller::search_announcements,
        announcements::controller::get_by_category,
        announcements::controller::get_announcement,
        announcements::controller::create_announcement,
        announcements::controller::update_announcement,
        announcements::controller::delete_announcement,
        emergency::controller::create_alert,
        emergency::controller::get_alerts,
        emergency::controller::get_my_alerts,
        emergency::controller::get_alert,
        emergency::controller::update_alert_status,
        emergency::controller::cancel_alert,
        locations::controller::get_locations,
        locations::controller::search_locations,
        locations::controller::get_location,
        locations::controller::create_location,
        locations::controller::update_location,
        locations::controller::delete_location,
    ),
    components(
        schemas(
            ErrorResponse,
            EventType,
            MembershipStatus,
            AnnouncementCategory,
            AnnouncementPriority,
            EmergencyStatus,
            LocationCategory,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sign-in for each account type"),
        (name = "Admin", description = "Accounts, classes, domains and bulk import"),
        (name = "Authority", description = "Domain complaint queue and domain management"),
        (name = "Faculty", description = "Class records kept by faculty"),
        (name = "Student", description = "Student profile and class views"),
        (name = "Problems", description = "Complaint filing and listings"),
        (name = "Lost & Found", description = "Lost and found board"),
        (name = "Marketplace", description = "Student marketplace"),
        (name = "Forum", description = "Student forum"),
        (name = "Events", description = "Faculty and club events"),
        (name = "Clubs", description = "Clubs, membership and galleries"),
        (name = "Announcements", description = "Campus announcements"),
        (name = "Emergency", description = "SOS alerts"),
        (name = "Campus Map", description = "Campus locations")
    ),
    info(
        title = "CampusDesk API",
        version = "0.1.0",
        description = "Campus management REST API built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_openapi_lists_versioned_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/admin/login"));
        assert!(doc.paths.paths.contains_key("/api/v1/event/register/{id}"));
        assert!(doc.paths.paths.keys().all(|p| p.starts_with("/api/v1/")));
    }
}
