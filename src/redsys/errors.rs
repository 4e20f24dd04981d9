//! Static lookup tables for gateway codes.
//!
//! Both tables are built once on first use and never change afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Message used when a code is not present in either table.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Error desconocido";

const GATEWAY_ERRORS: &[(&str, &str)] = &[
    ("SIS0007", "Error al desmontar el XML de entrada"),
    ("SIS0008", "Error falta Ds_Merchant_MerchantCode"),
    ("SIS0009", "Error de formato en Ds_Merchant_MerchantCode"),
    ("SIS0010", "Error falta Ds_Merchant_Terminal"),
    ("SIS0011", "Error de formato en Ds_Merchant_Terminal"),
    ("SIS0014", "Error de formato en Ds_Merchant_Order"),
    ("SIS0015", "Error falta Ds_Merchant_Currency"),
    ("SIS0016", "Error de formato en Ds_Merchant_Currency"),
    ("SIS0018", "Error falta Ds_Merchant_Amount"),
    ("SIS0019", "Error de formato en Ds_Merchant_Amount"),
    ("SIS0020", "Error falta Ds_Merchant_MerchantSignature"),
    ("SIS0021", "Error la Ds_Merchant_MerchantSignature viene vacía"),
    ("SIS0022", "Error de formato en Ds_Merchant_TransactionType"),
    ("SIS0023", "Error Ds_Merchant_TransactionType desconocido"),
    ("SIS0026", "Error No existe el comercio / terminal enviado"),
    ("SIS0027", "Error Moneda enviada por el comercio es diferente a la que tiene asignada para ese terminal"),
    ("SIS0028", "Error Comercio / terminal está dado de baja"),
    ("SIS0030", "Error en un pago con tarjeta ha llegado un tipo de operación no valido"),
    ("SIS0031", "Método de pago no definido"),
    ("SIS0034", "Error de acceso a la Base de Datos"),
    ("SIS0038", "Error en java"),
    ("SIS0040", "Error el comercio / terminal no tiene ningún método de pago asignado"),
    ("SIS0041", "Error en el cálculo de la firma de datos del comercio"),
    ("SIS0042", "La firma enviada no es correcta"),
    ("SIS0046", "El BIN de la tarjeta no está dado de alta"),
    ("SIS0051", "Error número de pedido repetido"),
    ("SIS0054", "Error no existe operación sobre la que realizar la devolución"),
    ("SIS0055", "Error no existe más de un pago con el mismo número de pedido"),
    ("SIS0056", "La operación sobre la que se desea devolver no está autorizada"),
    ("SIS0057", "El importe a devolver supera el permitido"),
    ("SIS0058", "Inconsistencia de datos, en la validación de una confirmación"),
    ("SIS0059", "Error no existe operación sobre la que realizar la devolución"),
    ("SIS0060", "Ya existe una confirmación asociada a la preautorización"),
    ("SIS0061", "La preautorización sobre la que se desea confirmar no está autorizada"),
    ("SIS0062", "El importe a confirmar supera el permitido"),
    ("SIS0063", "Error. Número de tarjeta no disponible"),
    ("SIS0064", "Error. El número de tarjeta no puede tener más de 19 posiciones"),
    ("SIS0065", "Error. El número de tarjeta no es numérico"),
    ("SIS0066", "Error. Mes de caducidad no disponible"),
    ("SIS0067", "Error. El mes de la caducidad no es numérico"),
    ("SIS0068", "Error. El mes de la caducidad no es válido"),
    ("SIS0069", "Error. Año de caducidad no disponible"),
    ("SIS0070", "Error. El Año de la caducidad no es numérico"),
    ("SIS0071", "Tarjeta caducada"),
    ("SIS0072", "Operación no anulable"),
    ("SIS0074", "Error falta Ds_Merchant_Order"),
    ("SIS0075", "Error el Ds_Merchant_Order tiene menos de 4 posiciones o más de 12"),
    ("SIS0076", "Error el Ds_Merchant_Order no tiene las cuatro primeras posiciones numéricas"),
    ("SIS0078", "Método de pago no disponible"),
    ("SIS0079", "Error al realizar el pago con tarjeta"),
    ("SIS0081", "La sesión es nueva, se han perdido los datos almacenados"),
    ("SIS0089", "El valor de Ds_Merchant_ExpiryDate no ocupa 4 posiciones"),
    ("SIS0092", "El valor de Ds_Merchant_ExpiryDate es nulo"),
    ("SIS0093", "Tarjeta no encontrada en la tabla de rangos"),
    ("SIS0112", "Error. El tipo de transacción especificado en Ds_Merchant_Transaction_Type no esta permitido"),
    ("SIS0115", "Error no existe operación sobre la que realizar el pago de la cuota"),
    ("SIS0116", "La operación sobre la que se desea pagar una cuota no es una operación válida"),
    ("SIS0117", "La operación sobre la que se desea pagar una cuota no está autorizada"),
    ("SIS0118", "Se ha excedido el importe total de las cuotas"),
    ("SIS0119", "Valor del campo Ds_Merchant_DateFrecuency no válido"),
    ("SIS0120", "Valor del campo Ds_Merchant_CargeExpiryDate no válido"),
    ("SIS0121", "Valor del campo Ds_Merchant_SumTotal no válido"),
    ("SIS0122", "Valor del campo Ds_merchant_DateFrecuency o Ds_Merchant_SumTotal tiene formato incorrecto"),
    ("SIS0123", "Se ha excedido la fecha tope para realizar transacciones"),
    ("SIS0124", "No ha transcurrido la frecuencia mínima en un pago recurrente sucesivo"),
    ("SIS0132", "La fecha de Confirmación de Autorización no puede superar en más de 7 días a la de Preautorización"),
    ("SIS0139", "Error el pago recurrente inicial está duplicado"),
    ("SIS0142", "Tiempo excedido para el pago"),
    ("SIS0216", "Error Ds_Merchant_CVV2 tiene mas de 3/4 posiciones"),
    ("SIS0217", "Error de formato en Ds_Merchant_CVV2"),
    ("SIS0221", "Error el CVV2 es obligatorio"),
    ("SIS0222", "Ya existe una anulación asociada a la preautorización"),
    ("SIS0223", "La preautorización que se desea anular no está autorizada"),
    ("SIS0225", "Error no existe operación sobre la que realizar la anulación"),
    ("SIS0226", "Inconsistencia de datos, en la validación de una anulación"),
    ("SIS0227", "Valor del campo Ds_Merchan_TransactionDate no válido"),
    ("SIS0252", "El comercio no permite el envío de tarjeta"),
    ("SIS0253", "La tarjeta no cumple el check-digit"),
    ("SIS0261", "Operación detenida por superar el control de restricciones en la entrada al TPV Virtual"),
    ("SIS0274", "Tipo de operación desconocida o no permitida por esta entrada al TPV Virtual"),
];

/// Decline reasons reported in `Ds_Response`.
const RESPONSE_CODES: &[(u32, &str)] = &[
    (101, "Tarjeta caducada"),
    (102, "Tarjeta en excepción transitoria o bajo sospecha de fraude"),
    (106, "Intentos de PIN excedidos"),
    (125, "Tarjeta no efectiva"),
    (129, "Código de seguridad (CVV2/CVC2) incorrecto"),
    (180, "Tarjeta ajena al servicio"),
    (184, "Error en la autenticación del titular"),
    (190, "Denegación sin especificar Motivo"),
    (191, "Fecha de caducidad errónea"),
    (202, "Tarjeta en excepción transitoria o bajo sospecha de fraude con retirada de tarjeta"),
    (904, "Comercio no registrado en FUC"),
    (909, "Error de sistema"),
    (912, "Emisor no disponible"),
    (913, "Pedido repetido"),
    (944, "Sesión Incorrecta"),
    (950, "Operación de devolución no permitida"),
    (9064, "Número de posiciones de la tarjeta incorrecto"),
    (9078, "No existe método de pago válido para esa tarjeta"),
    (9093, "Tarjeta no existente"),
    (9094, "Rechazo servidores internacionales"),
    (9104, "Comercio con \"titular seguro\" y titular sin clave de compra segura"),
    (9218, "El comercio no permite operaciones seguras por entrada /operaciones"),
    (9253, "Tarjeta no cumple el check-digit"),
    (9256, "El comercio no puede realizar preautorizaciones"),
    (9257, "Esta tarjeta no permite operativa de preautorizaciones"),
    (9261, "Operación detenida por superar el control de restricciones en la entrada al SIS"),
    (9912, "Emisor no disponible"),
    (9913, "Error en la confirmación que el comercio envía al TPV Virtual (solo aplicable en la opción de sincronización SOAP)"),
    (9914, "Confirmación \"KO\" del comercio (solo aplicable en la opción de sincronización SOAP)"),
    (9915, "A petición del usuario se ha cancelado el pago"),
    (9928, "Anulación de autorización en diferido realizada por el SIS (proceso batch)"),
    (9929, "Anulación de autorización en diferido realizada por el comercio"),
    (9997, "Se está procesando otra transacción en SIS con la misma tarjeta"),
    (9998, "Operación en proceso de solicitud de datos de la tarjeta. El sistema queda a la espera de que el titular inserte la tarjeta, la operación no se procesa"),
    (9999, "Operación que ha sido redirigida al emisor a autenticar"),
];

static GATEWAY_ERROR_TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| GATEWAY_ERRORS.iter().copied().collect());

static RESPONSE_CODE_TABLE: LazyLock<HashMap<u32, &'static str>> =
    LazyLock::new(|| RESPONSE_CODES.iter().copied().collect());

/// Looks up a `CODIGO` value such as `SIS0051`.
pub fn gateway_error_message(code: &str) -> Option<&'static str> {
    GATEWAY_ERROR_TABLE
        .get(code.trim().to_ascii_uppercase().as_str())
        .copied()
}

/// Looks up a `Ds_Response` value. Leading zeros are ignored, so `0190` and
/// `190` resolve to the same entry.
pub fn response_code_message(code: &str) -> Option<&'static str> {
    let code: u32 = code.trim().parse().ok()?;
    RESPONSE_CODE_TABLE.get(&code).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_gateway_error() {
        assert_eq!(
            gateway_error_message("SIS0051"),
            Some("Error número de pedido repetido")
        );
        assert_eq!(
            gateway_error_message("sis0042"),
            Some("La firma enviada no es correcta")
        );
    }

    #[test]
    fn test_unknown_gateway_error() {
        assert_eq!(gateway_error_message("SIS9999"), None);
        assert_eq!(gateway_error_message(""), None);
    }

    #[test]
    fn test_response_code_ignores_leading_zeros() {
        assert_eq!(response_code_message("0190"), Some("Denegación sin especificar Motivo"));
        assert_eq!(response_code_message("9915"), response_code_message("09915"));
        assert_eq!(response_code_message("0000"), None);
        assert_eq!(response_code_message("abc"), None);
    }

    #[test]
    fn test_tables_have_no_duplicate_keys() {
        assert_eq!(GATEWAY_ERROR_TABLE.len(), GATEWAY_ERRORS.len());
        assert_eq!(RESPONSE_CODE_TABLE.len(), RESPONSE_CODES.len());
    }
}
