//! Static pages. Markup is rendered elsewhere; these endpoints describe the
//! forms and content a front end needs.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FormDescriptor {
    pub title: &'static str,
    pub action: &'static str,
    pub method: &'static str,
    pub fields: &'static [FormField],
}

const fn text(name: &'static str, label: &'static str) -> FormField {
    FormField {
        name,
        label,
        kind: "text",
    }
}

static WORKER_FORM: FormDescriptor = FormDescriptor {
    title: "Register as a worker",
    action: "/register",
    method: "POST",
    fields: &[
        text("name", "Full name"),
        text("location", "Location"),
        text("skills", "Skills"),
        text("experience", "Experience"),
        FormField {
            name: "phone_number",
            label: "Phone number",
            kind: "tel",
        },
    ],
};

static CONTRACTOR_FORM: FormDescriptor = FormDescriptor {
    title: "Register as a contractor",
    action: "/contractor-register",
    method: "POST",
    fields: &[
        text("username", "Username"),
        FormField {
            name: "password",
            label: "Password",
            kind: "password",
        },
        text("name", "Name"),
        FormField {
            name: "phone_number",
            label: "Phone number",
            kind: "tel",
        },
        text("age", "Age"),
        text("job_type", "Type of work"),
    ],
};

static LOGIN_FORM: FormDescriptor = FormDescriptor {
    title: "Contractor login",
    action: "/login",
    method: "POST",
    fields: &[
        text("username", "Username"),
        FormField {
            name: "password",
            label: "Password",
            kind: "password",
        },
    ],
};

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub application: &'static str,
    pub version: &'static str,
    pub links: &'static [(&'static str, &'static str)],
}

pub async fn index() -> Json<IndexPage> {
    Json(IndexPage {
        application: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        links: &[
            ("register", "/register"),
            ("contractor_register", "/contractor-register"),
            ("login", "/login"),
            ("dashboard", "/dashboard"),
            ("how_it_works", "/how-it-works"),
        ],
    })
}

pub async fn worker_form() -> Json<&'static FormDescriptor> {
    Json(&WORKER_FORM)
}

pub async fn contractor_form() -> Json<&'static FormDescriptor> {
    Json(&CONTRACTOR_FORM)
}

pub async fn login_form() -> Json<&'static FormDescriptor> {
    Json(&LOGIN_FORM)
}

#[derive(Debug, Serialize)]
pub struct HowItWorks {
    pub steps: &'static [&'static str],
}

pub async fn how_it_works() -> Json<HowItWorks> {
    Json(HowItWorks {
        steps: &[
            "Workers register once with their name, location, skills, experience and phone number.",
            "When a worker is free, they give a missed call to the service number. No data plan is needed.",
            "The missed call marks that worker as available.",
            "Contractors log in and see every available worker on the dashboard.",
            "A contractor presses hire and the worker receives an SMS with the contractor's details.",
        ],
    })
}

pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
