//! Canned art stories served when the text model is unavailable or unusable.

use crate::models::art_story::{ContentSource, StorySection};
use crate::stories::generator::GeneratedStory;

/// Short, well-established descriptions of art forms we know by name.
const KNOWN_FORMS: &[(&str, &str)] = &[
    (
        "madhubani",
        "Madhubani painting comes from the Mithila region of Bihar and Nepal, where it \
         began as wall and floor painting for festivals and weddings.",
    ),
    (
        "warli",
        "Warli art is the painting tradition of the Warli community of Maharashtra, \
         built from circles, triangles and lines drawn in white on earthen walls.",
    ),
    (
        "pattachitra",
        "Pattachitra is a scroll painting tradition of Odisha and West Bengal, painted \
         on treated cloth and often telling stories from epics and temple lore.",
    ),
    (
        "kalamkari",
        "Kalamkari is a hand-painted and block-printed textile tradition of Andhra \
         Pradesh and Telangana, coloured with natural dyes.",
    ),
    (
        "bidri",
        "Bidriware is a metal craft from Bidar in Karnataka, in which silver is inlaid \
         into a blackened alloy of zinc and copper.",
    ),
    (
        "dhokra",
        "Dhokra is non-ferrous metal casting by the lost-wax method, practised by \
         metalsmith communities across central and eastern India.",
    ),
];

fn known_description(art_form: &str) -> Option<&'static str> {
    let key = art_form.to_lowercase();
    KNOWN_FORMS
        .iter()
        .find(|(name, _)| key.contains(name))
        .map(|(_, description)| *description)
}

pub fn fallback_story(art_form: &str, region: Option<&str>) -> GeneratedStory {
    let place = region
        .map(|r| format!(" in {r}"))
        .unwrap_or_default();
    let intro = known_description(art_form).map(str::to_string).unwrap_or_else(|| {
        format!(
            "{art_form} is a living craft tradition{place}, carried forward by artisans who \
             learned it from earlier generations."
        )
    });

    let mut key_facts = vec![
        format!("{art_form} is practised by hand, piece by piece."),
        "Skills are commonly passed down within families and communities.".to_string(),
        "Buying directly from artisans keeps more of the price with the maker.".to_string(),
    ];
    if let Some(region) = region {
        key_facts.insert(1, format!("This story focuses on {art_form} as practised in {region}."));
    }

    GeneratedStory {
        title: format!("The Living Tradition of {art_form}"),
        summary: format!(
            "{intro} This is an introduction to where the craft comes from, how it is made, \
             and how the people who make it can be supported."
        ),
        sections: vec![
            StorySection {
                heading: "Origins".to_string(),
                body: format!(
                    "{intro} Like many traditional crafts, it grew out of everyday life: \
                     ritual, celebration, and the materials close at hand."
                ),
            },
            StorySection {
                heading: "Materials and Technique".to_string(),
                body: format!(
                    "Each piece of {art_form} is made through a sequence of careful steps \
                     that take years to master. Artisans often prepare their own materials \
                     and tools, and small variations in every piece are a mark of the hand \
                     that made it."
                ),
            },
            StorySection {
                heading: "The Artisans Today".to_string(),
                body: format!(
                    "Today, makers of {art_form}{place} balance tradition with new designs \
                     and new markets. Fair prices, steady orders and recognition help keep \
                     the craft viable for the next generation."
                ),
            },
            StorySection {
                heading: "How to Support the Craft".to_string(),
                body: "Buy from artisans directly, credit the makers by name when sharing \
                       their work, and support NGOs that run training and market access \
                       programmes for craft communities."
                    .to_string(),
            },
        ],
        key_facts,
        source: ContentSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_art_form_uses_its_description() {
        let story = fallback_story("Madhubani painting", None);
        assert!(story.summary.contains("Mithila"));
        assert_eq!(story.source, ContentSource::Fallback);
    }

    #[test]
    fn test_unknown_art_form_is_named_throughout() {
        let story = fallback_story("Sikki grass weaving", Some("Bihar"));
        assert_eq!(story.title, "The Living Tradition of Sikki grass weaving");
        assert!(story.summary.contains("Sikki grass weaving is a living craft tradition in Bihar"));
        assert!(story.key_facts.iter().any(|f| f.contains("Bihar")));
    }

    #[test]
    fn test_fallback_always_has_sections() {
        let story = fallback_story("Pottery", None);
        assert_eq!(story.sections.len(), 4);
        assert!(story.sections.iter().all(|s| !s.body.is_empty()));
    }
}
