// All model-facing prompt constants for the pipeline.
// The headings requested here are the same vocabulary the result parser
// recognizes (see `parser::MarkerConfig::default`) — change them together.

/// Analysis prompt template. Replace `{role}`, `{location}`,
/// `{experience_years}`, `{skills}`, `{trend_block}`, `{listings_block}`,
/// `{omitted_note}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"As a career expert, analyze these job opportunities for a candidate seeking a {role} position in {location} with {experience_years} years of experience and these skills: {skills}.

MARKET CONTEXT:
{trend_block}

JOB LISTINGS:
{listings_block}{omitted_note}

INSTRUCTIONS:
Pick the 3 best matching jobs and present them in ranked order. Use EXACTLY this structure:

💼 TOP JOB RECOMMENDATIONS
#1 — <job title> at <company>
Pros:
- <pro>
Cons:
- <con>
Advice: <one short paragraph of tailored application advice>

(repeat for #2 and #3)

🔍 SKILLS MATCH ANALYSIS
<how the candidate's skills and experience line up with these jobs and the market>

📝 APPLICATION TIPS
<resume and application strategy tips for this search>"#;

/// Analysis prompt used when the scrape found nothing. States the emptiness
/// explicitly so the model does not hallucinate listings.
pub const NO_MATCHES_PROMPT_TEMPLATE: &str = r#"As a career expert, advise a candidate seeking a {role} position in {location} with {experience_years} years of experience and these skills: {skills}.

No job listings matched the search criteria.

MARKET CONTEXT:
{trend_block}

INSTRUCTIONS:
Do NOT invent job listings. Use EXACTLY this structure:

🔍 SKILLS MATCH ANALYSIS
<how the candidate's skills compare to current market demand>

📝 APPLICATION TIPS
<how to widen the search and strengthen the profile>"#;

/// Trend-analysis prompt template for the standalone trends operation.
/// Replace `{category}` and `{trend_block}`.
pub const TREND_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze these market trends for the {category} industry:

{trend_block}

Cover, in order:
📊 INDUSTRY TRENDS SUMMARY
🔥 TOP SKILLS IN DEMAND
📈 CAREER GROWTH OPPORTUNITIES
🎯 RECOMMENDATIONS FOR JOB SEEKERS"#;
