//! Scheduling router — maps a (meeting type, visitor type) selection onto
//! the outbound Calendly URL.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Script the client loads to open the scheduling popup.
pub const WIDGET_SCRIPT_URL: &str = "https://assets.calendly.com/assets/external/widget.js";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingType {
    Strategy,
    Valuation,
    ExitPlanning,
    #[default]
    General,
}

impl MeetingType {
    pub const ALL: [MeetingType; 4] = [
        MeetingType::Strategy,
        MeetingType::Valuation,
        MeetingType::ExitPlanning,
        MeetingType::General,
    ];

    /// URL path segment.
    pub fn as_str(self) -> &'static str {
        match self {
            MeetingType::Strategy => "strategy",
            MeetingType::Valuation => "valuation",
            MeetingType::ExitPlanning => "exit-planning",
            MeetingType::General => "general",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeetingType::Strategy => "Strategy Call",
            MeetingType::Valuation => "Valuation Discussion",
            MeetingType::ExitPlanning => "Exit Planning",
            MeetingType::General => "General Inquiry",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitorType {
    Founder,
    Investor,
    Advisor,
    #[default]
    General,
}

impl VisitorType {
    pub const ALL: [VisitorType; 4] = [
        VisitorType::Founder,
        VisitorType::Investor,
        VisitorType::Advisor,
        VisitorType::General,
    ];

    /// Value of the `utm_campaign` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            VisitorType::Founder => "founder",
            VisitorType::Investor => "investor",
            VisitorType::Advisor => "advisor",
            VisitorType::General => "general",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VisitorType::Founder => "Business Owner/Founder",
            VisitorType::Investor => "Investor/Buyer",
            VisitorType::Advisor => "Advisor/Consultant",
            VisitorType::General => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingSelection {
    #[serde(default, rename = "meeting")]
    pub meeting_type: MeetingType,
    #[serde(default, rename = "visitor")]
    pub visitor_type: VisitorType,
}

/// Build the scheduling URL for a selection.
///
/// The default meeting type adds no path segment and the default visitor
/// type adds no campaign parameters, so `(General, General)` yields `base`
/// unchanged.
pub fn build_url(base: &str, meeting: MeetingType, visitor: VisitorType) -> String {
    let mut url = base.to_string();
    if meeting != MeetingType::General {
        if !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(meeting.as_str());
    }
    if visitor != VisitorType::General {
        url.push_str("?utm_source=website&utm_medium=direct&utm_campaign=");
        url.push_str(visitor.as_str());
    }
    url
}

/// What the client needs to open the scheduling widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handoff {
    pub url: String,
    pub widget_script: &'static str,
}

/// Two single-select fields plus a submit that hands off to the widget.
#[derive(Debug, Clone)]
pub struct RoutingForm {
    base_url: String,
    selection: SchedulingSelection,
}

impl RoutingForm {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            selection: SchedulingSelection::default(),
        }
    }

    pub fn select_meeting(&mut self, meeting: MeetingType) {
        self.selection.meeting_type = meeting;
    }

    pub fn select_visitor(&mut self, visitor: VisitorType) {
        self.selection.visitor_type = visitor;
    }

    pub fn selection(&self) -> SchedulingSelection {
        self.selection
    }

    /// Finalize the current selection.
    pub fn submit(&self) -> Handoff {
        let url = build_url(
            &self.base_url,
            self.selection.meeting_type,
            self.selection.visitor_type,
        );
        debug!(
            meeting = self.selection.meeting_type.as_str(),
            visitor = self.selection.visitor_type.as_str(),
            url = %url,
            "Scheduling handoff"
        );
        Handoff {
            url,
            widget_script: WIDGET_SCRIPT_URL,
        }
    }
}

/// Shared state for scheduling routes.
#[derive(Clone)]
pub struct SchedulingRouteState {
    pub base_url: String,
}

/// GET /api/scheduling/url?meeting=&visitor=
///
/// Unknown values are rejected by the query extractor with 400.
async fn scheduling_url(
    State(state): State<SchedulingRouteState>,
    Query(selection): Query<SchedulingSelection>,
) -> impl IntoResponse {
    let mut form = RoutingForm::new(state.base_url);
    form.select_meeting(selection.meeting_type);
    form.select_visitor(selection.visitor_type);
    Json(form.submit())
}

/// GET /api/scheduling/options
///
/// Choices for the routing form, in display order.
async fn scheduling_options() -> impl IntoResponse {
    let meetings: Vec<_> = MeetingType::ALL
        .iter()
        .map(|m| serde_json::json!({"id": m, "label": m.label()}))
        .collect();
    let visitors: Vec<_> = VisitorType::ALL
        .iter()
        .map(|v| serde_json::json!({"id": v, "label": v.label()}))
        .collect();
    Json(serde_json::json!({
        "meeting_types": meetings,
        "visitor_types": visitors,
    }))
}

/// Build the scheduling REST routes.
pub fn scheduling_routes(state: SchedulingRouteState) -> Router {
    Router::new()
        .route("/api/scheduling/url", get(scheduling_url))
        .route("/api/scheduling/options", get(scheduling_options))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    const BASE: &str = "https://calendly.com/structuredpartners";

    #[test]
    fn defaults_leave_base_untouched() {
        assert_eq!(build_url(BASE, MeetingType::General, VisitorType::General), BASE);
    }

    #[test]
    fn meeting_and_visitor_compose() {
        assert_eq!(
            build_url(BASE, MeetingType::Strategy, VisitorType::Founder),
            format!("{BASE}/strategy?utm_source=website&utm_medium=direct&utm_campaign=founder")
        );
        assert_eq!(
            build_url(BASE, MeetingType::ExitPlanning, VisitorType::General),
            format!("{BASE}/exit-planning")
        );
        assert_eq!(
            build_url(BASE, MeetingType::General, VisitorType::Investor),
            format!("{BASE}?utm_source=website&utm_medium=direct&utm_campaign=investor")
        );
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        assert_eq!(
            build_url("https://calendly.com/acme/", MeetingType::Valuation, VisitorType::General),
            "https://calendly.com/acme/valuation"
        );
    }

    #[test]
    fn routing_form_starts_general() {
        let mut form = RoutingForm::new(BASE);
        assert_eq!(form.selection(), SchedulingSelection::default());
        assert_eq!(form.submit().url, BASE);

        form.select_meeting(MeetingType::Valuation);
        form.select_visitor(VisitorType::Advisor);
        let handoff = form.submit();
        assert_eq!(
            handoff.url,
            format!("{BASE}/valuation?utm_source=website&utm_medium=direct&utm_campaign=advisor")
        );
        assert_eq!(handoff.widget_script, WIDGET_SCRIPT_URL);
    }

    fn app() -> Router {
        scheduling_routes(SchedulingRouteState {
            base_url: BASE.to_string(),
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Option<Value>) {
        let resp = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    #[tokio::test]
    async fn url_route_reads_query() {
        let (status, body) =
            get_json(app(), "/api/scheduling/url?meeting=exit-planning&visitor=founder").await;
        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(
            body["url"],
            format!("{BASE}/exit-planning?utm_source=website&utm_medium=direct&utm_campaign=founder")
        );
        assert_eq!(body["widget_script"], WIDGET_SCRIPT_URL);

        let (_, body) = get_json(app(), "/api/scheduling/url").await;
        assert_eq!(body.unwrap()["url"], BASE);
    }

    #[tokio::test]
    async fn unknown_meeting_type_is_rejected() {
        let (status, _) = get_json(app(), "/api/scheduling/url?meeting=lunch").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn options_route_lists_choices_in_order() {
        let (_, body) = get_json(app(), "/api/scheduling/options").await;
        let body = body.unwrap();
        assert_eq!(body["meeting_types"][2]["id"], "exit-planning");
        assert_eq!(body["visitor_types"][0]["label"], "Business Owner/Founder");
        assert_eq!(body["visitor_types"].as_array().unwrap().len(), 4);
    }
}
