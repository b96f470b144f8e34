//! Numbered sub-objects of a patient record.
//!
//! Every structured record on a patient page (the primary property set,
//! owner, study binding, collaborators, relatives, VCF files) is an XWiki
//! object addressed by class name and number. The generic operations here
//! back all of the typed helpers.

use crate::client::{page_path, PhenoTipsClient};
use crate::error::{PhenoTipsError, Result};
use crate::models::{
    PropertyMap, OBJECT_CLASS_COLLABORATOR, OBJECT_CLASS_RELATIVE, OBJECT_CLASS_VCF,
};
use crate::naming::{qualify, unqualify, USERS_SPACE};
use crate::xml;

/// Path of the object listing of a patient, optionally narrowed to a class.
pub(crate) fn objects_path(patient_id: &str, class: Option<&str>) -> String {
    match class {
        Some(class) => format!(
            "{}/objects/{}",
            page_path(patient_id),
            urlencoding::encode(class)
        ),
        None => format!("{}/objects", page_path(patient_id)),
    }
}

/// Path of a single object.
pub(crate) fn object_path(patient_id: &str, class: &str, number: u32) -> String {
    format!("{}/{}", objects_path(patient_id, Some(class)), number)
}

/// Form fields `property#<key>=<value>` for an object write.
pub(crate) fn property_form(props: &PropertyMap) -> Vec<(String, String)> {
    props
        .iter()
        .map(|(key, value)| (format!("property#{key}"), value.clone()))
        .collect()
}

/// A kind of numbered sub-object with a fixed class.
///
/// Implementors can rewrite properties on the way to and from the server,
/// e.g. to qualify reference names.
pub trait PatientObject {
    /// XWiki class name of the object.
    const CLASS_NAME: &'static str;

    /// Properties as they should be written.
    fn encode(props: &PropertyMap) -> PropertyMap {
        props.clone()
    }

    /// Properties as they should be returned to callers.
    fn decode(props: PropertyMap) -> Result<PropertyMap> {
        Ok(props)
    }
}

/// A collaborator with access to a patient record.
///
/// The `collaborator` property holds a user or group name; it is stored
/// qualified and returned bare.
#[derive(Debug, Clone, Copy)]
pub struct Collaborator;

impl PatientObject for Collaborator {
    const CLASS_NAME: &'static str = OBJECT_CLASS_COLLABORATOR;

    fn encode(props: &PropertyMap) -> PropertyMap {
        let mut props = props.clone();
        if let Some(name) = props.get_mut("collaborator") {
            *name = qualify(name, USERS_SPACE);
        }
        props
    }

    fn decode(mut props: PropertyMap) -> Result<PropertyMap> {
        if let Some(name) = props.get_mut("collaborator") {
            if !name.is_empty() {
                *name = unqualify(name, USERS_SPACE)?;
            }
        }
        Ok(props)
    }
}

/// A relative of the patient.
#[derive(Debug, Clone, Copy)]
pub struct Relative;

impl PatientObject for Relative {
    const CLASS_NAME: &'static str = OBJECT_CLASS_RELATIVE;
}

/// A VCF file record.
#[derive(Debug, Clone, Copy)]
pub struct Vcf;

impl PatientObject for Vcf {
    const CLASS_NAME: &'static str = OBJECT_CLASS_VCF;
}

impl PhenoTipsClient {
    /// Create an object and return its number.
    #[tracing::instrument(skip(self, props))]
    pub async fn create_object(
        &self,
        patient_id: &str,
        class: &str,
        props: &PropertyMap,
    ) -> Result<u32> {
        let mut form = vec![("className".to_string(), class.to_string())];
        form.extend(property_form(props));

        let response = self
            .post_form(&objects_path(patient_id, None), &form)
            .await?;
        let what = format!("{class} object on {patient_id}");
        let tail = Self::location_tail(&response, &what)?;
        let number = tail
            .parse::<u32>()
            .map_err(|_| PhenoTipsError::MissingLocation(what))?;
        tracing::info!(number, "created object");
        Ok(number)
    }

    /// Fetch all properties of an object.
    #[tracing::instrument(skip(self))]
    pub async fn get_object(&self, patient_id: &str, class: &str, number: u32) -> Result<PropertyMap> {
        let response = self
            .get_raw(&object_path(patient_id, class, number))
            .await?;
        let body = response.text().await?;
        xml::parse_object_properties(&body)
    }

    /// Overwrite the given properties of an object; others keep their values.
    #[tracing::instrument(skip(self, props))]
    pub async fn set_object(
        &self,
        patient_id: &str,
        class: &str,
        number: u32,
        props: &PropertyMap,
    ) -> Result<()> {
        self.put_form(&object_path(patient_id, class, number), &property_form(props))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_object(&self, patient_id: &str, class: &str, number: u32) -> Result<()> {
        self.delete_raw(&object_path(patient_id, class, number))
            .await?;
        tracing::info!("deleted object");
        Ok(())
    }

    /// Numbers of all objects of a class on a patient.
    #[tracing::instrument(skip(self))]
    pub async fn list_objects(&self, patient_id: &str, class: &str) -> Result<Vec<u32>> {
        let response = self.get_raw(&objects_path(patient_id, Some(class))).await?;
        let body = response.text().await?;
        xml::parse_object_numbers(&body)
    }

    /// Create a typed sub-object.
    pub async fn create_sub_object<T: PatientObject>(
        &self,
        patient_id: &str,
        props: &PropertyMap,
    ) -> Result<u32> {
        self.create_object(patient_id, T::CLASS_NAME, &T::encode(props))
            .await
    }

    /// Fetch a typed sub-object.
    pub async fn get_sub_object<T: PatientObject>(
        &self,
        patient_id: &str,
        number: u32,
    ) -> Result<PropertyMap> {
        T::decode(self.get_object(patient_id, T::CLASS_NAME, number).await?)
    }

    /// Update a typed sub-object.
    pub async fn set_sub_object<T: PatientObject>(
        &self,
        patient_id: &str,
        number: u32,
        props: &PropertyMap,
    ) -> Result<()> {
        self.set_object(patient_id, T::CLASS_NAME, number, &T::encode(props))
            .await
    }

    pub async fn delete_sub_object<T: PatientObject>(
        &self,
        patient_id: &str,
        number: u32,
    ) -> Result<()> {
        self.delete_object(patient_id, T::CLASS_NAME, number).await
    }

    pub async fn list_sub_objects<T: PatientObject>(&self, patient_id: &str) -> Result<Vec<u32>> {
        self.list_objects(patient_id, T::CLASS_NAME).await
    }

    pub async fn create_collaborator(&self, patient_id: &str, props: &PropertyMap) -> Result<u32> {
        self.create_sub_object::<Collaborator>(patient_id, props).await
    }

    pub async fn get_collaborator(&self, patient_id: &str, number: u32) -> Result<PropertyMap> {
        self.get_sub_object::<Collaborator>(patient_id, number).await
    }

    pub async fn set_collaborator(
        &self,
        patient_id: &str,
        number: u32,
        props: &PropertyMap,
    ) -> Result<()> {
        self.set_sub_object::<Collaborator>(patient_id, number, props)
            .await
    }

    pub async fn delete_collaborator(&self, patient_id: &str, number: u32) -> Result<()> {
        self.delete_sub_object::<Collaborator>(patient_id, number).await
    }

    pub async fn list_collaborators(&self, patient_id: &str) -> Result<Vec<u32>> {
        self.list_sub_objects::<Collaborator>(patient_id).await
    }

    pub async fn create_relative(&self, patient_id: &str, props: &PropertyMap) -> Result<u32> {
        self.create_sub_object::<Relative>(patient_id, props).await
    }

    pub async fn get_relative(&self, patient_id: &str, number: u32) -> Result<PropertyMap> {
        self.get_sub_object::<Relative>(patient_id, number).await
    }

    pub async fn set_relative(
        &self,
        patient_id: &str,
        number: u32,
        props: &PropertyMap,
    ) -> Result<()> {
        self.set_sub_object::<Relative>(patient_id, number, props).await
    }

    pub async fn delete_relative(&self, patient_id: &str, number: u32) -> Result<()> {
        self.delete_sub_object::<Relative>(patient_id, number).await
    }

    pub async fn list_relatives(&self, patient_id: &str) -> Result<Vec<u32>> {
        self.list_sub_objects::<Relative>(patient_id).await
    }

    pub async fn create_vcf(&self, patient_id: &str, props: &PropertyMap) -> Result<u32> {
        self.create_sub_object::<Vcf>(patient_id, props).await
    }

    pub async fn get_vcf(&self, patient_id: &str, number: u32) -> Result<PropertyMap> {
        self.get_sub_object::<Vcf>(patient_id, number).await
    }

    pub async fn set_vcf(&self, patient_id: &str, number: u32, props: &PropertyMap) -> Result<()> {
        self.set_sub_object::<Vcf>(patient_id, number, props).await
    }

    pub async fn delete_vcf(&self, patient_id: &str, number: u32) -> Result<()> {
        self.delete_sub_object::<Vcf>(patient_id, number).await
    }

    pub async fn list_vcfs(&self, patient_id: &str) -> Result<Vec<u32>> {
        self.list_sub_objects::<Vcf>(patient_id).await
    }
}
