//! Prompt assembly for the extraction request.

/// Instructions and the expected field skeleton sent ahead of every
/// transcript. The formatting rules keep the model's output machine
/// checkable: fixed phone/date/time shapes, real booleans, omission over
/// guessing.
const INSTRUCTIONS: &str = r#"You are a disaster intake assistant. Extract information from the following speech text.
Format the response as a clean JSON object. Only include fields that are clearly mentioned.

Rules:
1. Format phone numbers as XXX-XXX-XXXX
2. Format dates as YYYY-MM-DD
3. Format times as HH:MM (24-hour)
4. Capitalize proper nouns
5. If information is ambiguous, omit it
6. Convert yes/no responses to boolean true/false
7. For needs assessment, interpret context to determine true/false values

Expected fields:
{
  "first_name": "string",
  "last_name": "string",
  "date_of_birth": "string (YYYY-MM-DD)",
  "phone_number": "string (XXX-XXX-XXXX)",
  "email_address": "string",
  "primary_language": "string",
  "affected_address": "string",
  "type_of_residence": "string (house/apartment/mobile home/etc)",
  "ownership_status": "string (own/rent/lease/etc)",
  "household_members": number,
  "number_of_pets": number,
  "type_of_pets": ["string"],
  "type_of_disaster": "string",
  "incident_date": "string (YYYY-MM-DD)",
  "incident_time": "string (HH:MM)",
  "damage_description": "string",
  "is_home_habitable": boolean,
  "insurance_status": "string",
  "needs_assessment": {
    "shelter_needed": boolean,
    "food_water_needed": boolean,
    "clothing_needed": boolean,
    "health_services_needed": boolean,
    "medication_needed": boolean,
    "baby_supplies_needed": boolean
  },
  "has_disabled_members": boolean
}"#;

/// Build the full prompt for one transcript.
///
/// The transcript should already be normalized; it is embedded verbatim
/// in quotes at the end of the instructions.
pub fn build_prompt(transcript: &str) -> String {
    format!("{INSTRUCTIONS}\n\nSpeech text: \"{transcript}\"")
}
