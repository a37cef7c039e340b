use fake::Fake;
use fake::faker::address::{en as address_en, pt_br as address_pt_br};
use fake::faker::lorem::{en as lorem_en, pt_br as lorem_pt_br};
use fake::faker::name::{en as name_en, pt_br as name_pt_br};
use rand::RngCore;

use crate::content::ContentProvider;
use crate::faker_rs::locales::LocaleKey;

const PARAGRAPH_SENTENCES: std::ops::Range<usize> = 2..5;

/// `ContentProvider` backed by the `fake` crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FakeRsAdapter {
    locale: LocaleKey,
}

impl FakeRsAdapter {
    pub fn new(locale: LocaleKey) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> LocaleKey {
        self.locale
    }
}

impl ContentProvider for FakeRsAdapter {
    fn text(&self, rng: &mut dyn RngCore) -> String {
        match self.locale {
            LocaleKey::EnUs => lorem_en::Paragraph(PARAGRAPH_SENTENCES).fake_with_rng(rng),
            LocaleKey::PtBr => lorem_pt_br::Paragraph(PARAGRAPH_SENTENCES).fake_with_rng(rng),
        }
    }

    fn name(&self, rng: &mut dyn RngCore) -> String {
        match self.locale {
            LocaleKey::EnUs => name_en::Name().fake_with_rng(rng),
            LocaleKey::PtBr => name_pt_br::Name().fake_with_rng(rng),
        }
    }

    fn address(&self, rng: &mut dyn RngCore) -> String {
        match self.locale {
            LocaleKey::EnUs => {
                let number: String = address_en::BuildingNumber().fake_with_rng(rng);
                let street: String = address_en::StreetName().fake_with_rng(rng);
                let city: String = address_en::CityName().fake_with_rng(rng);
                let state: String = address_en::StateAbbr().fake_with_rng(rng);
                let zip: String = address_en::ZipCode().fake_with_rng(rng);
                format!("{number} {street}\n{city}, {state} {zip}")
            }
            LocaleKey::PtBr => {
                let street: String = address_pt_br::StreetName().fake_with_rng(rng);
                let number: String = address_pt_br::BuildingNumber().fake_with_rng(rng);
                let city: String = address_pt_br::CityName().fake_with_rng(rng);
                let state: String = address_pt_br::StateAbbr().fake_with_rng(rng);
                let zip: String = address_pt_br::ZipCode().fake_with_rng(rng);
                format!("{street}, {number}\n{city} - {state}\n{zip}")
            }
        }
    }
}
