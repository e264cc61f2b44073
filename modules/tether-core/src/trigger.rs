//! JavaScript emitted for event triggers.
//!
//! A trigger POSTs `{instance, id, data, parents?, parents_data?}` back to the
//! server and evaluates the returned code. The replay chain lives in closure
//! variables (`parents`, `parents_data`, `parent_id`, `parent_data`) declared
//! by the outermost trigger and extended by every nested one, so the browser
//! always submits the full ancestry of the handler it fires.

use serde_json::Value;

use crate::encode::quote;
use crate::error::EncodingError;
use crate::registry::CallbackId;

/// Data sent along with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// JavaScript object expression evaluated in the browser when the event
    /// fires, e.g. `{width: $(window).width()}`.
    Expr(String),
    /// A fixed JSON value.
    Json(Value),
}

impl Default for EventData {
    fn default() -> Self {
        EventData::Expr("{}".to_string())
    }
}

impl From<&str> for EventData {
    fn from(expr: &str) -> Self {
        EventData::Expr(expr.to_string())
    }
}

impl From<String> for EventData {
    fn from(expr: String) -> Self {
        EventData::Expr(expr)
    }
}

impl From<Value> for EventData {
    fn from(value: Value) -> Self {
        EventData::Json(value)
    }
}

impl EventData {
    /// JavaScript text for this data.
    pub fn to_js(&self) -> Result<String, EncodingError> {
        match self {
            EventData::Expr(expr) => Ok(expr.clone()),
            EventData::Json(value) => Ok(serde_json::to_string(value)?),
        }
    }

    /// Add a string entry. Both forms must describe an object.
    pub fn with_entry(self, key: &str, value: &str) -> Result<Self, EncodingError> {
        match self {
            EventData::Expr(expr) => {
                let trimmed = expr.trim();
                let inner = trimmed
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                    .ok_or_else(|| EncodingError::MalformedData(expr.clone()))?
                    .trim();

                let entry = format!("{key}: {}", quote(value));
                if inner.is_empty() {
                    Ok(EventData::Expr(format!("{{{entry}}}")))
                } else {
                    Ok(EventData::Expr(format!("{{{inner}, {entry}}}")))
                }
            }
            EventData::Json(Value::Object(mut map)) => {
                map.insert(key.to_string(), Value::String(value.to_string()));
                Ok(EventData::Json(Value::Object(map)))
            }
            EventData::Json(other) => Err(EncodingError::MalformedData(other.to_string())),
        }
    }
}

/// Everything needed to render one trigger.
pub(crate) struct Trigger<'a> {
    pub instance: u64,
    pub id: CallbackId,
    pub data: &'a str,
    pub element: Option<&'a str>,
    pub nested: bool,
    pub post_location: &'a str,
    pub debug: bool,
}

impl Trigger<'_> {
    /// Declarations that set up (top level) or extend (nested) the chain.
    pub fn chain_declarations(&self) -> String {
        let (id, data) = (self.id, self.data);
        if self.nested {
            format!(
                "\nowner=this;\
                 parents.push(parent_id);\
                 parents_data[parent_id]=parent_data;\
                 parent_id={id};\
                 parent_data={data};"
            )
        } else {
            format!(
                "\nvar owner=this;\
                 var parents=[];\
                 var parents_data={{}};\
                 var parent_id={id};\
                 var parent_data={data};"
            )
        }
    }

    /// The ajax round trip itself.
    pub fn request(&self) -> String {
        let mut fields = format!("instance: {}, ", self.instance);
        if self.nested {
            fields.push_str("parents: parents, parents_data: parents_data, ");
        }
        fields.push_str(&format!("id: {}, ", self.id));
        if let Some(element) = self.element {
            fields.push_str(&format!("element: '{element}', "));
        }
        fields.push_str("data: parent_data");

        let debug = if self.debug { "console.log(data.code);" } else { "" };

        format!(
            "jq.ajax({{\
             type: 'POST', \
             url: {url}, \
             contentType: 'application/json', \
             dataType: 'json', \
             data: JSON.stringify({{{fields}}})\
             }}).done(function( data ) {{\
             if(data.error){{alert(data.error);}}\
             else{{eval(data.code);{debug}}}\
             }}).fail(function(data){{alert('Error Occurred');}});",
            url = self.post_location,
        )
    }

    /// `function(event){...}` usable as a JavaScript callback argument.
    pub fn callback_function(&self) -> String {
        format!(
            "function(event){{{}{}}}",
            self.chain_declarations(),
            self.request()
        )
    }

    /// Statement for an immediately fired trigger.
    pub fn immediate(&self) -> String {
        format!("{}{}", self.chain_declarations(), self.request())
    }

    /// `.on('type', function(event){...});` without the receiver.
    pub fn element_handler(&self, event_type: &str) -> String {
        format!(
            ".on('{event_type}', function(event){{{}event.preventDefault();{}}});",
            self.chain_declarations(),
            self.request()
        )
    }
}
