use crate::api::attendance::{AttendanceListResponse, CheckInReq};
use crate::api::dashboard::{DashboardSummary, ProjectUsage};
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::api::leave::{CreateLeave, LeaveListResponse};
use crate::api::message::{ConversationResponse, SendMessageReq};
use crate::api::overtime::{CreateOvertime, OvertimeListResponse};
use crate::api::project::{CreateProject, LogTimeReq, TimesheetResponse};
use crate::api::shift::{AssignShift, CreateShift, ScheduleDay};
use crate::model::attendance::{Attendance, AttendanceStatus, CheckMethod};
use crate::model::employee::{Department, Employee, JobTitle};
use crate::model::leave::{LeaveRequest, LeaveType, RequestStatus};
use crate::model::message::Message;
use crate::model::overtime::OvertimeRequest;
use crate::model::project::{Project, TimeEntry};
use crate::model::shift::Shift;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workpulse API",
        version = "1.0.0",
        description = r#"
## Workforce & Attendance Management

This API powers a workforce management backend covering the day-to-day
HR operations of an organization.

### 🔹 Key Features
- **Employee Management**
  - Onboard, update, list, and view employee profiles
- **Attendance**
  - GPS and biometric check-in/check-out with working-hours tracking
- **Leave & Overtime**
  - Leave requests, overtime claims, and TOIL balances
- **Shift Scheduling**
  - Shift templates and per-day assignments
- **Messaging**
  - Internal direct messages with live WebSocket fan-out at `/ws`
- **Project Time Tracking**
  - Book hours against projects with daily allocation limits
- **Dashboards**
  - Company-wide attendance and project aggregates

### 🔐 Security
Endpoints are protected with **JWT Bearer authentication**. Sensitive
operations require the **Admin** or **HR** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::list_departments,
        crate::api::employee::list_job_titles,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,
        crate::api::attendance::list_attendance,

        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::create_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::toil_balance,

        crate::api::overtime::create_overtime,
        crate::api::overtime::list_overtime,
        crate::api::overtime::approve_overtime,
        crate::api::overtime::reject_overtime,

        crate::api::shift::create_shift,
        crate::api::shift::list_shifts,
        crate::api::shift::update_shift,
        crate::api::shift::delete_shift,
        crate::api::shift::assign_shift,
        crate::api::shift::schedule,

        crate::api::message::send_message,
        crate::api::message::conversation,
        crate::api::message::mark_read,

        crate::api::project::create_project,
        crate::api::project::list_projects,
        crate::api::project::update_project,
        crate::api::project::log_time,
        crate::api::project::timesheet,

        crate::api::dashboard::summary,
        crate::api::dashboard::projects
    ),
    components(
        schemas(
            Employee,
            Department,
            JobTitle,
            CreateEmployee,
            EmployeeListResponse,

            Attendance,
            AttendanceStatus,
            CheckMethod,
            CheckInReq,
            AttendanceListResponse,

            LeaveRequest,
            LeaveType,
            RequestStatus,
            CreateLeave,
            LeaveListResponse,

            OvertimeRequest,
            CreateOvertime,
            OvertimeListResponse,

            Shift,
            CreateShift,
            AssignShift,
            ScheduleDay,

            Message,
            SendMessageReq,
            ConversationResponse,

            Project,
            TimeEntry,
            CreateProject,
            LogTimeReq,
            TimesheetResponse,

            DashboardSummary,
            ProjectUsage
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave and TOIL APIs"),
        (name = "Overtime", description = "Overtime claim APIs"),
        (name = "Shift", description = "Shift scheduling APIs"),
        (name = "Message", description = "Internal messaging APIs"),
        (name = "Project", description = "Project time tracking APIs"),
        (name = "Dashboard", description = "Admin dashboard APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
