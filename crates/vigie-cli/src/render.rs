//! Output rendering: JSON, `;`-delimited CSV, or XML.

use std::io::Cursor;

use clap::ValueEnum;
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use serde::Serialize;
use vigie_core::violation::{EstablishmentRef, EstablishmentStat, ViolationRecord};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
  Json,
  Csv,
  Xml,
}

/// An item that can be written as one XML element.
pub trait XmlItem {
  fn write_xml(&self, w: &mut XmlWriter) -> anyhow::Result<()>;
}

/// Render `items` as a JSON array, a CSV table with header, or an XML
/// document wrapped in `<root>`.
pub fn render<T>(items: &[T], root: &str, format: Format) -> anyhow::Result<String>
where
  T: Serialize + XmlItem,
{
  match format {
    Format::Json => Ok(serde_json::to_string_pretty(items)?),
    Format::Csv => to_csv(items),
    Format::Xml => {
      let mut w = Writer::new(Cursor::new(Vec::new()));
      w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
      w.write_event(Event::Start(BytesStart::new(root)))?;
      for item in items {
        item.write_xml(&mut w)?;
      }
      w.write_event(Event::End(BytesEnd::new(root)))?;
      Ok(String::from_utf8(w.into_inner().into_inner())?)
    }
  }
}

/// `;`-delimited CSV with a header row taken from the serde field names.
fn to_csv<T: Serialize>(items: &[T]) -> anyhow::Result<String> {
  let mut wtr = csv::WriterBuilder::new()
    .delimiter(b';')
    .from_writer(Vec::new());
  for item in items {
    wtr.serialize(item)?;
  }
  let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
  Ok(String::from_utf8(bytes)?)
}

/// Distinct names render as a bare JSON array of strings.
pub fn render_names(names: &[String], format: Format) -> anyhow::Result<String> {
  match format {
    Format::Json => Ok(serde_json::to_string_pretty(names)?),
    _ => {
      let rows: Vec<NameRow<'_>> = names
        .iter()
        .map(|n| NameRow { establishment: n })
        .collect();
      render(&rows, "etablissements", format)
    }
  }
}

/// Statistics keep `nb` in JSON and XML; the CSV header spells the count out.
pub fn render_stats(stats: &[EstablishmentStat], format: Format) -> anyhow::Result<String> {
  match format {
    Format::Csv => {
      let rows: Vec<StatCsvRow<'_>> = stats
        .iter()
        .map(|s| StatCsvRow { establishment: &s.establishment, count: s.count })
        .collect();
      to_csv(&rows)
    }
    _ => render(stats, "statistiques", format),
  }
}

#[derive(Serialize)]
struct StatCsvRow<'a> {
  #[serde(rename = "etablissement")]
  establishment: &'a str,
  #[serde(rename = "nombre d'infractions connues")]
  count:         u64,
}

#[derive(Serialize)]
pub struct NameRow<'a> {
  #[serde(rename = "etablissement")]
  establishment: &'a str,
}

// ─── XML items ───────────────────────────────────────────────────────────────

fn write_text_elem(
  w: &mut XmlWriter,
  tag: &str,
  attrs: &[(&str, &str)],
  text: &str,
) -> anyhow::Result<()> {
  let mut el = BytesStart::new(tag);
  for (k, v) in attrs {
    el.push_attribute((*k, *v));
  }
  w.write_event(Event::Start(el))?;
  w.write_event(Event::Text(BytesText::new(text)))?;
  w.write_event(Event::End(BytesEnd::new(tag)))?;
  Ok(())
}

impl XmlItem for NameRow<'_> {
  fn write_xml(&self, w: &mut XmlWriter) -> anyhow::Result<()> {
    write_text_elem(w, "etablissement", &[], self.establishment)
  }
}

impl XmlItem for EstablishmentStat {
  fn write_xml(&self, w: &mut XmlWriter) -> anyhow::Result<()> {
    let count = self.count.to_string();
    write_text_elem(w, "etablissement", &[("nb", count.as_str())], &self.establishment)
  }
}

impl XmlItem for EstablishmentRef {
  fn write_xml(&self, w: &mut XmlWriter) -> anyhow::Result<()> {
    let id = self.id.to_string();
    write_text_elem(w, "etablissement", &[("id_poursuite", id.as_str())], &self.establishment)
  }
}

impl XmlItem for ViolationRecord {
  fn write_xml(&self, w: &mut XmlWriter) -> anyhow::Result<()> {
    let id = self.id.to_string();
    let business_id = self.business_id.to_string();

    let mut el = BytesStart::new("contravention");
    el.push_attribute(("id_poursuite", id.as_str()));
    w.write_event(Event::Start(el))?;

    let fields: [(&str, Option<&str>); 12] = [
      ("business_id", Some(business_id.as_str())),
      ("date", Some(self.date.as_str())),
      ("description", Some(self.description.as_str())),
      ("adresse", Some(self.address.as_str())),
      ("date_jugement", self.judgment_date.as_deref()),
      ("etablissement", Some(self.establishment.as_str())),
      ("montant", Some(self.amount.as_str())),
      ("proprietaire", Some(self.owner.as_str())),
      ("ville", Some(self.city.as_str())),
      ("statut", Some(self.status.as_str())),
      ("date_statut", self.status_date.as_deref()),
      ("categorie", Some(self.category.as_str())),
    ];
    for (tag, value) in fields {
      match value {
        Some(text) => write_text_elem(w, tag, &[], text)?,
        None => w.write_event(Event::Empty(BytesStart::new(tag)))?,
      }
    }

    w.write_event(Event::End(BytesEnd::new("contravention")))?;
    Ok(())
  }
}
