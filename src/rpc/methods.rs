//! Static JSON-RPC method table.
//!
//! Each method maps to one backend call: a target service, an HTTP verb, a
//! path, the params copied into the query string, and the params that must
//! be present.

use serde_json::{json, Map, Value};
use url::form_urlencoded;

use crate::config::RpcConfig;
use crate::forwarding::ForwardRequest;

/// Backend a method is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Contacts,
    Tickets,
    Kb,
}

impl Target {
    /// Registry name for this target.
    pub fn service_name(self, config: &RpcConfig) -> &str {
        match self {
            Target::Contacts => &config.contacts_service,
            Target::Tickets => &config.tickets_service,
            Target::Kb => &config.kb_service,
        }
    }
}

/// How the backend body becomes the JSON-RPC `result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Passthrough,
    /// First element of an array body, `null` when empty.
    FirstOrNull,
}

/// One row of the method table.
#[derive(Debug)]
pub struct MethodSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub target: Target,
    pub verb: &'static str,
    pub path: &'static str,
    /// Params copied into the query string, in order.
    pub query: &'static [&'static str],
    /// Fixed query pairs appended after `query`.
    pub fixed_query: &'static [(&'static str, &'static str)],
    /// Send the whole params object as the request body.
    pub params_as_body: bool,
    pub required: &'static [&'static str],
    pub shape: ResultShape,
}

pub static METHODS: &[MethodSpec] = &[
    MethodSpec {
        name: "getCustomerByEmail",
        description: "Get customer details by email",
        target: Target::Contacts,
        verb: "GET",
        path: "/contacts",
        query: &["email"],
        fixed_query: &[],
        params_as_body: false,
        required: &["email"],
        shape: ResultShape::FirstOrNull,
    },
    MethodSpec {
        name: "listOpenTickets",
        description: "List open tickets for a customer",
        target: Target::Tickets,
        verb: "GET",
        path: "/tickets",
        query: &["crmId"],
        fixed_query: &[("status", "open")],
        params_as_body: false,
        required: &["crmId"],
        shape: ResultShape::Passthrough,
    },
    MethodSpec {
        name: "createSupportTicket",
        description: "Create a new support ticket",
        target: Target::Tickets,
        verb: "POST",
        path: "/tickets",
        query: &[],
        fixed_query: &[],
        params_as_body: true,
        required: &["crmId", "subject", "description", "priority"],
        shape: ResultShape::Passthrough,
    },
    MethodSpec {
        name: "searchKB",
        description: "Search the knowledge base",
        target: Target::Kb,
        verb: "GET",
        path: "/search",
        query: &["query"],
        fixed_query: &[],
        params_as_body: false,
        required: &["query"],
        shape: ResultShape::Passthrough,
    },
];

/// Look up a method by its exact name.
pub fn find(name: &str) -> Option<&'static MethodSpec> {
    METHODS.iter().find(|m| m.name == name)
}

impl MethodSpec {
    /// Required params that are absent, null or empty strings.
    pub fn missing_params(&self, params: &Value) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|name| match params.get(name) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            })
            .collect()
    }

    /// Build the backend call for `params`. Params must already be checked
    /// with [`MethodSpec::missing_params`].
    pub fn build_request(&self, params: &Value) -> ForwardRequest {
        let mut path = self.path.to_string();

        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut has_query = false;
        for name in self.query {
            if let Some(value) = params.get(name).and_then(query_value) {
                query.append_pair(name, &value);
                has_query = true;
            }
        }
        for (name, value) in self.fixed_query {
            query.append_pair(name, value);
            has_query = true;
        }
        if has_query {
            path.push('?');
            path.push_str(&query.finish());
        }

        let request = ForwardRequest::new(self.verb, path);
        if self.params_as_body {
            request.with_body(params.clone())
        } else {
            request
        }
    }

    pub fn shape_result(&self, body: Value) -> Value {
        match self.shape {
            ResultShape::Passthrough => body,
            ResultShape::FirstOrNull => match body {
                Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
                Value::Null => Value::Null,
                other => other,
            },
        }
    }

    /// JSON schema describing this method's params.
    pub fn params_schema(&self) -> Value {
        let mut properties = Map::new();
        for name in self.required {
            let property = match *name {
                "priority" => json!({
                    "type": "string",
                    "enum": ["low", "medium", "high"],
                    "description": "Ticket priority"
                }),
                other => json!({ "type": "string", "description": describe_param(other) }),
            };
            properties.insert(name.to_string(), property);
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required,
        })
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn describe_param(name: &str) -> &'static str {
    match name {
        "email" => "Customer's email address",
        "crmId" => "Customer's CRM ID",
        "subject" => "Ticket subject",
        "description" => "Ticket description",
        "query" => "Search query",
        _ => "",
    }
}

/// The tool catalogue: method name → description and params schema.
pub fn catalogue() -> Value {
    let tools: Map<String, Value> = METHODS
        .iter()
        .map(|m| {
            (
                m.name.to_string(),
                json!({ "description": m.description, "parameters": m.params_schema() }),
            )
        })
        .collect();
    Value::Object(tools)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_exact() {
        assert!(find("searchKB").is_some());
        assert!(find("searchkb").is_none());
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_query_is_encoded() {
        let spec = find("getCustomerByEmail").unwrap();
        let request = spec.build_request(&json!({ "email": "ada+crm@example.com" }));
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/contacts?email=ada%2Bcrm%40example.com");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_open_tickets_filter() {
        let spec = find("listOpenTickets").unwrap();
        let request = spec.build_request(&json!({ "crmId": 42 }));
        assert_eq!(request.path, "/tickets?crmId=42&status=open");
    }

    #[test]
    fn test_create_ticket_sends_params_as_body() {
        let spec = find("createSupportTicket").unwrap();
        let params = json!({
            "crmId": "c-1",
            "subject": "Login",
            "description": "Cannot log in",
            "priority": "high"
        });
        assert!(spec.missing_params(&params).is_empty());
        let request = spec.build_request(&params);
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/tickets");
        assert_eq!(request.body, Some(params));
    }

    #[test]
    fn test_missing_params() {
        let spec = find("createSupportTicket").unwrap();
        assert_eq!(
            spec.missing_params(&json!({ "crmId": "c-1", "subject": "", "priority": null })),
            vec!["subject", "description", "priority"]
        );
    }

    #[test]
    fn test_first_or_null() {
        let spec = find("getCustomerByEmail").unwrap();
        assert_eq!(spec.shape_result(json!([{ "id": 1 }, { "id": 2 }])), json!({ "id": 1 }));
        assert_eq!(spec.shape_result(json!([])), Value::Null);
    }

    #[test]
    fn test_catalogue_lists_every_method() {
        let tools = catalogue();
        for method in METHODS {
            assert!(tools.get(method.name).is_some());
        }
        assert_eq!(
            tools["createSupportTicket"]["parameters"]["properties"]["priority"]["enum"],
            json!(["low", "medium", "high"])
        );
    }
}
