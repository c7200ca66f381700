//! Built-in JSON Schema documents for the gateway envelopes.

use serde_json::{json, Value};

/// Schema for the inbound authorizer request.
pub fn request_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["protocols", "connectionMetadata", "protocolData"],
        "properties": {
            "token": { "type": ["string", "null"] },
            "signatureVerified": { "type": ["boolean", "null"] },
            "protocols": {
                "type": "array",
                "minItems": 1,
                "items": { "enum": ["tls", "mqtt"] }
            },
            "connectionMetadata": {
                "type": "object",
                "required": ["id"],
                "properties": { "id": { "type": "string" } }
            },
            "protocolData": {
                "type": "object",
                "required": ["mqtt"],
                "properties": {
                    "mqtt": {
                        "type": "object",
                        "required": ["username", "password", "clientId"],
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" },
                            "clientId": { "type": "string" }
                        }
                    },
                    "tls": {
                        "type": ["object", "null"],
                        "required": ["serverName"],
                        "properties": { "serverName": { "type": "string" } }
                    }
                }
            }
        }
    })
}

/// Schema for the outbound decision.
pub fn response_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": [
            "password",
            "isAuthenticated",
            "principalId",
            "disconnectAfterInSeconds",
            "refreshAfterInSeconds",
            "policyDocuments"
        ],
        "properties": {
            "password": { "type": ["string", "null"] },
            "isAuthenticated": { "type": "boolean" },
            "principalId": { "type": "string", "pattern": "^[a-zA-Z0-9]+$" },
            "disconnectAfterInSeconds": { "type": "integer", "minimum": 0 },
            "refreshAfterInSeconds": { "type": "integer", "minimum": 0 },
            "policyDocuments": {
                "type": "array",
                "minItems": 1,
                "maxItems": 1,
                "items": {
                    "type": "object",
                    "required": ["Version", "Statement"],
                    "properties": {
                        "Version": { "const": "2012-10-17" },
                        "Statement": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["Action", "Effect", "Resource"],
                                "properties": {
                                    "Action": {
                                        "enum": [
                                            "iot:Connect",
                                            "iot:GetRetainedMessage",
                                            "iot:ListRetainedMessages",
                                            "iot:Publish",
                                            "iot:Receive",
                                            "iot:RetainPublish",
                                            "iot:Subscribe",
                                            "iot:DeleteThingShadow",
                                            "iot:GetThingShadow",
                                            "iot:ListNamedShadowsForThing",
                                            "iot:UpdateThingShadow"
                                        ]
                                    },
                                    "Effect": { "enum": ["Allow", "Deny"] },
                                    "Resource": { "type": "string" }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}
